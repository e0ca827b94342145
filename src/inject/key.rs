//! 绑定键
//!
//! 以（能力类型，可选限定名）二元组标识一条绑定，
//! 同一能力类型可通过限定名注册多条互不冲突的绑定。

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 绑定的查找标识
///
/// 相等性与哈希只取决于能力类型与限定名；类型名仅用于诊断信息。
#[derive(Clone)]
pub struct Key {
    type_id: TypeId,
    type_name: &'static str,
    qualifier: Option<Cow<'static, str>>,
}

impl Key {
    /// 构造无限定名的键
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: None,
        }
    }

    /// 构造带限定名的键
    pub fn named<T: ?Sized + 'static>(qualifier: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            qualifier: Some(qualifier.into()),
        }
    }

    /// 能力类型名（诊断用）
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// 限定名
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.qualifier == other.qualifier
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.qualifier.hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("type_name", &self.type_name)
            .field("qualifier", &self.qualifier)
            .finish()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "'{}' (\"{}\")", self.type_name, qualifier),
            None => write!(f, "'{}'", self.type_name),
        }
    }
}
