use parking_lot::Mutex;

use super::types::{NewUser, User, UserPatch};

/// ユーザーの保存先
///
/// 永続化バックエンドを差し替える場合はこのトレイトを実装する。
pub trait UserStore: Send + Sync {
    fn list(&self) -> Vec<User>;

    fn get(&self, id: u64) -> Option<User>;

    /// 次のIDを割り当てて追加
    fn create(&self, user: NewUser) -> User;

    /// 指定されたフィールドだけ更新。存在しなければ `None`
    fn update(&self, id: u64, patch: UserPatch) -> Option<User>;

    /// 削除できたら `true`
    fn delete(&self, id: u64) -> bool;
}

/// メモリ上のストア。IDは削除後も再利用しない
#[derive(Debug)]
pub struct InMemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    users: Vec<User>,
    next_id: u64,
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                users: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn list(&self) -> Vec<User> {
        self.inner.lock().users.clone()
    }

    fn get(&self, id: u64) -> Option<User> {
        self.inner.lock().users.iter().find(|u| u.id == id).cloned()
    }

    fn create(&self, user: NewUser) -> User {
        let mut inner = self.inner.lock();
        let created = User {
            id: inner.next_id,
            name: user.name,
            email: user.email,
        };
        inner.next_id += 1;
        inner.users.push(created.clone());
        created
    }

    fn update(&self, id: u64, patch: UserPatch) -> Option<User> {
        let mut inner = self.inner.lock();
        let user = inner.users.iter_mut().find(|u| u.id == id)?;
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        Some(user.clone())
    }

    fn delete(&self, id: u64) -> bool {
        let mut inner = self.inner.lock();
        match inner.users.iter().position(|u| u.id == id) {
            Some(index) => {
                inner.users.remove(index);
                true
            }
            None => false,
        }
    }
}
