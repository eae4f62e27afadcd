use std::fmt;

use serde::{Deserialize, Serialize};

/// 要素の探し方。`//` で始まる文字列はXPath、それ以外はCSSセレクター
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with("//") {
            Locator::XPath(raw)
        } else {
            Locator::Css(raw)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }

    /// 要素の有無を返すJavaScript式
    pub fn presence_script(&self) -> String {
        let literal = js_string(self.as_str());
        match self {
            Locator::Css(_) => format!("document.querySelector({}) !== null", literal),
            Locator::XPath(_) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue !== null",
                literal
            ),
        }
    }
}

impl From<String> for Locator {
    fn from(raw: String) -> Self {
        Locator::parse(raw)
    }
}

impl From<&str> for Locator {
    fn from(raw: &str) -> Self {
        Locator::parse(raw)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        match locator {
            Locator::Css(s) | Locator::XPath(s) => s,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css:{}", s),
            Locator::XPath(s) => write!(f, "xpath:{}", s),
        }
    }
}

/// 任意の文字列をJavaScriptの文字列リテラルにする
pub(crate) fn js_string(value: &str) -> String {
    // JSON文字列はそのままJSの文字列リテラルとして有効
    serde_json::Value::String(value.to_string()).to_string()
}
