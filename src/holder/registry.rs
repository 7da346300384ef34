//! Slot table mapping opaque handles to live holders.
//!
//! A handle packs `slot index + 1` in its low 32 bits and the slot generation
//! in its high 32 bits. Destroying a holder bumps the slot generation, so every
//! handle previously issued for that slot stops resolving.

use std::ffi::CStr;
use std::fmt;
use std::sync::LazyLock;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::common::config::{ObjCfg, DEFAULT_MAX_LIVE};
use crate::common::error::{ObjError, ObjResult};

use super::domain::{Holder, Scalar, ScalarKind, ScalarType, ValueHolder};

/// Opaque reference to a holder. `Handle::NULL` is never issued.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(u64);

impl Handle {
    pub const NULL: Handle = Handle(0);

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    fn pack(index: usize, generation: u32) -> Self {
        Self((u64::from(generation) << 32) | (index as u64 + 1))
    }

    /// Slot index and generation; `None` for the null handle.
    fn unpack(&self) -> Option<(usize, u32)> {
        let low = (self.0 & 0xFFFF_FFFF) as u32;
        if low == 0 {
            return None;
        }
        Some(((low - 1) as usize, (self.0 >> 32) as u32))
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    holder: Option<Holder>,
}

/// Owned table of holders addressed by generation-checked handles.
#[derive(Debug)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
    max_live: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_capacity_limit(DEFAULT_MAX_LIVE)
    }
}

impl Registry {
    pub fn new(cfg: &ObjCfg) -> Self {
        Self::with_capacity_limit(cfg.max_live)
    }

    pub fn with_capacity_limit(max_live: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            // Index + 1 must fit the low half of a handle.
            max_live: max_live.min(u32::MAX as usize - 1),
        }
    }

    /// Number of live holders.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn max_live(&self) -> usize {
        self.max_live
    }

    /// Store a new holder for `value`.
    pub fn create(&mut self, value: Scalar) -> ObjResult<Handle> {
        self.insert(Holder::new(value))
    }

    /// Store an existing typed holder, keeping its identity.
    pub fn adopt<T: ScalarType>(&mut self, holder: ValueHolder<T>) -> ObjResult<Handle> {
        self.insert(holder.into_erased())
    }

    fn insert(&mut self, holder: Holder) -> ObjResult<Handle> {
        if self.live >= self.max_live {
            warn!(max_live = self.max_live, "live object limit reached");
            return Err(ObjError::CapacityExhausted(self.max_live));
        }

        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 1,
                    holder: None,
                });
                self.slots.len() - 1
            }
        };

        let slot = &mut self.slots[index];
        debug!(id = holder.id().raw(), kind = %holder.kind(), index, "holder created");
        slot.holder = Some(holder);
        self.live += 1;
        Ok(Handle::pack(index, slot.generation))
    }

    /// Release the holder behind `handle` and return it.
    pub fn destroy(&mut self, handle: Handle) -> ObjResult<Holder> {
        let (index, _) = self.locate(handle)?;
        let slot = &mut self.slots[index];
        let holder = slot.holder.take().ok_or(ObjError::InvalidHandle(handle.raw()))?;
        self.live -= 1;

        match slot.generation.checked_add(1) {
            Some(next) => {
                slot.generation = next;
                self.free.push(index);
            }
            // Exhausted slots are retired rather than risk a repeated handle.
            None => debug!(index, "slot retired"),
        }

        debug!(id = holder.id().raw(), %handle, "holder destroyed");
        Ok(holder)
    }

    /// Destroy only when `handle` holds `kind`; leaves the holder alive otherwise.
    pub fn destroy_as(&mut self, handle: Handle, kind: ScalarKind) -> ObjResult<Holder> {
        self.expect_kind(handle, kind)?;
        self.destroy(handle)
    }

    pub fn holder(&self, handle: Handle) -> ObjResult<&Holder> {
        let (index, _) = self.locate(handle)?;
        self.slots[index]
            .holder
            .as_ref()
            .ok_or(ObjError::InvalidHandle(handle.raw()))
    }

    fn holder_mut(&mut self, handle: Handle) -> ObjResult<&mut Holder> {
        let (index, _) = self.locate(handle)?;
        self.slots[index]
            .holder
            .as_mut()
            .ok_or(ObjError::InvalidHandle(handle.raw()))
    }

    pub fn get(&self, handle: Handle) -> ObjResult<Scalar> {
        Ok(self.holder(handle)?.value())
    }

    /// Overwrite the payload; the kind of `value` must match the holder's.
    /// Returns the same handle for chaining.
    pub fn set(&mut self, handle: Handle, value: Scalar) -> ObjResult<Handle> {
        let holder = self.holder_mut(handle)?;
        holder
            .replace(value)
            .map_err(|actual| ObjError::TypeMismatch {
                handle: handle.raw(),
                expected: value.kind(),
                actual,
            })?;
        Ok(handle)
    }

    pub fn get_as<T: ScalarType>(&self, handle: Handle) -> ObjResult<T> {
        let value = self.get(handle)?;
        T::from_scalar(value).ok_or(ObjError::TypeMismatch {
            handle: handle.raw(),
            expected: T::KIND,
            actual: value.kind(),
        })
    }

    pub fn set_as<T: ScalarType>(&mut self, handle: Handle, value: T) -> ObjResult<Handle> {
        self.set(handle, value.into_scalar())
    }

    pub fn kind(&self, handle: Handle) -> ObjResult<ScalarKind> {
        Ok(self.holder(handle)?.kind())
    }

    /// Identity label owned by the holder. The backing buffer stays put until
    /// the holder is destroyed, even if the table grows.
    pub fn identity(&self, handle: Handle) -> ObjResult<&CStr> {
        Ok(self.holder(handle)?.label().as_c_str())
    }

    pub fn identity_as(&self, handle: Handle, kind: ScalarKind) -> ObjResult<&CStr> {
        self.expect_kind(handle, kind)?;
        self.identity(handle)
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.holder(handle).is_ok()
    }

    fn expect_kind(&self, handle: Handle, expected: ScalarKind) -> ObjResult<()> {
        let actual = self.kind(handle)?;
        if actual != expected {
            return Err(ObjError::TypeMismatch {
                handle: handle.raw(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    fn locate(&self, handle: Handle) -> ObjResult<(usize, u32)> {
        let (index, generation) = handle.unpack().ok_or(ObjError::NullHandle)?;
        match self.slots.get(index) {
            Some(slot) if slot.generation == generation => Ok((index, generation)),
            _ => Err(ObjError::InvalidHandle(handle.raw())),
        }
    }
}

static GLOBAL: LazyLock<Mutex<Registry>> =
    LazyLock::new(|| Mutex::new(Registry::new(&ObjCfg::load())));

/// Process-wide registry backing the C ABI.
pub fn global() -> &'static Mutex<Registry> {
    &GLOBAL
}
