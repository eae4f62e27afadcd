//! ブラウザ操作
//!
//! - [`Locator`]: CSS / XPath の要素指定
//! - [`ChromeLauncher`]: chromiumoxide によるセッション生成

mod chrome;
mod locator;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use locator::Locator;
