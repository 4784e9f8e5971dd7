/// Layer of a scene object. Higher layers paint over lower ones.
///
/// New objects join the current top layer; `ToFront`/`ToBack` open a layer
/// above or below everything else.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Layer(pub i32);

impl Layer {
    #[inline]
    pub const fn above(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    #[inline]
    pub const fn below(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

/// Paint-order key: by layer, then by the sequence number handed out when the
/// key was assigned. Field order matters for the derived `Ord`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PaintKey {
    pub layer: Layer,
    pub seq: u32,
}
