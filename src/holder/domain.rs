//! Value-holder definitions and the scalar kinds it can carry.

use std::ffi::CString;
use std::fmt;

use crate::common::error::{ObjError, ObjResult};
use crate::common::ids::ObjectId;

/// Tag identifying the scalar carried by a holder. Values are part of the ABI.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ScalarKind {
    Int = 1,
    Float = 2,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
        }
    }

    pub fn zero(&self) -> Scalar {
        match self {
            ScalarKind::Int => Scalar::Int(0),
            ScalarKind::Float => Scalar::Float(0.0),
        }
    }
}

impl TryFrom<u32> for ScalarKind {
    type Error = ObjError;

    fn try_from(tag: u32) -> ObjResult<Self> {
        match tag {
            1 => Ok(ScalarKind::Int),
            2 => Ok(ScalarKind::Float),
            other => Err(ObjError::UnknownKind(other)),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged payload stored in every holder.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Scalar {
    Int(i32),
    Float(f32),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Float(_) => ScalarKind::Float,
        }
    }
}

/// Rust types that can live inside a holder.
pub trait ScalarType: Copy + Default + fmt::Debug + 'static {
    const KIND: ScalarKind;

    fn into_scalar(self) -> Scalar;

    /// `None` when `scalar` is of another kind.
    fn from_scalar(scalar: Scalar) -> Option<Self>;
}

impl ScalarType for i32 {
    const KIND: ScalarKind = ScalarKind::Int;

    fn into_scalar(self) -> Scalar {
        Scalar::Int(self)
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Int(n) => Some(n),
            _ => None,
        }
    }
}

impl ScalarType for f32 {
    const KIND: ScalarKind = ScalarKind::Float;

    fn into_scalar(self) -> Scalar {
        Scalar::Float(self)
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Float(n) => Some(n),
            _ => None,
        }
    }
}

/// Type-erased holder kept in the registry.
///
/// The label is stored as a `CString` so a pointer to it can be handed across
/// the boundary; its heap buffer never moves while the holder is alive.
#[derive(Debug)]
pub struct Holder {
    id: ObjectId,
    label: CString,
    value: Scalar,
}

impl Holder {
    pub fn new(value: Scalar) -> Self {
        let id = ObjectId::next();
        Self {
            id,
            label: identity_label(id),
            value,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ScalarKind {
        self.value.kind()
    }

    pub fn value(&self) -> Scalar {
        self.value
    }

    pub fn label(&self) -> &CString {
        &self.label
    }

    /// Replace the payload, keeping the kind. Returns the kind held on mismatch.
    pub(crate) fn replace(&mut self, value: Scalar) -> Result<(), ScalarKind> {
        if value.kind() != self.kind() {
            return Err(self.kind());
        }
        self.value = value;
        Ok(())
    }
}

/// Statically typed holder for Rust callers.
#[derive(Debug)]
pub struct ValueHolder<T: ScalarType> {
    id: ObjectId,
    label: CString,
    value: T,
}

impl<T: ScalarType> ValueHolder<T> {
    /// Holder with the zero value of `T`.
    pub fn new() -> Self {
        Self::with_value(T::default())
    }

    pub fn with_value(value: T) -> Self {
        let id = ObjectId::next();
        Self {
            id,
            label: identity_label(id),
            value,
        }
    }

    pub fn get(&self) -> T {
        self.value
    }

    pub fn set(&mut self, value: T) -> &mut Self {
        self.value = value;
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn label(&self) -> &str {
        // Labels are built from ASCII hex in `identity_label`.
        self.label.to_str().unwrap_or_default()
    }

    /// Erase the static type so the holder can be stored in a registry.
    pub fn into_erased(self) -> Holder {
        Holder {
            id: self.id,
            label: self.label,
            value: self.value.into_scalar(),
        }
    }

    /// Recover the static type; hands the holder back when the kind differs.
    pub fn from_erased(holder: Holder) -> Result<Self, Holder> {
        match T::from_scalar(holder.value) {
            Some(value) => Ok(Self {
                id: holder.id,
                label: holder.label,
                value,
            }),
            None => Err(holder),
        }
    }
}

impl<T: ScalarType> Default for ValueHolder<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn identity_label(id: ObjectId) -> CString {
    // Display output is `obj-` plus hex digits, so it never contains NUL.
    CString::new(id.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_are_stable() {
        assert_eq!(ScalarKind::Int as u32, 1);
        assert_eq!(ScalarKind::Float as u32, 2);
        assert_eq!(ScalarKind::try_from(2u32), Ok(ScalarKind::Float));
        assert_eq!(ScalarKind::try_from(0u32), Err(ObjError::UnknownKind(0)));
        assert_eq!(ScalarKind::try_from(3u32), Err(ObjError::UnknownKind(3)));
    }

    #[test]
    fn default_holder_is_zero() {
        assert_eq!(ValueHolder::<i32>::new().get(), 0);
        assert_eq!(ValueHolder::<f32>::default().get(), 0.0);
        assert_eq!(ScalarKind::Float.zero(), Scalar::Float(0.0));
    }

    #[test]
    fn set_chains_and_keeps_identity() {
        let mut holder = ValueHolder::with_value(5i32);
        let label = holder.label().to_string();
        assert_eq!(holder.set(6).set(7).get(), 7);
        assert_eq!(holder.label(), label);
        assert!(label.starts_with("obj-"));
    }

    #[test]
    fn distinct_holders_have_distinct_labels() {
        let a = ValueHolder::with_value(1i32);
        let b = ValueHolder::with_value(2i32);
        assert_ne!(a.label(), b.label());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn erasure_keeps_identity_and_checks_kind() {
        let typed = ValueHolder::with_value(3.5f32);
        let id = typed.id();
        let erased = typed.into_erased();
        assert_eq!(erased.kind(), ScalarKind::Float);
        assert_eq!(erased.id(), id);

        let erased = ValueHolder::<i32>::from_erased(erased).unwrap_err();
        let back = ValueHolder::<f32>::from_erased(erased).unwrap();
        assert_eq!(back.get(), 3.5);
        assert_eq!(back.id(), id);
    }

    #[test]
    fn replace_rejects_other_kind() {
        let mut holder = Holder::new(Scalar::Int(1));
        assert_eq!(holder.replace(Scalar::Float(2.0)), Err(ScalarKind::Int));
        assert_eq!(holder.value(), Scalar::Int(1));
        holder.replace(Scalar::Int(9)).unwrap();
        assert_eq!(holder.value(), Scalar::Int(9));
    }
}
