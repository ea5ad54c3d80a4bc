//! Signing request flags.

bitflags::bitflags! {
    /// Flags carried by a signing request and matched by suffix patterns.
    ///
    /// `CONTENT_ATTACHED` and `DETACHED_SIGNATURE` are mutually exclusive;
    /// a request carrying both is rejected before any file is touched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SignFlags: u32 {
        /// Embed the signed content itself rather than its digest.
        const CONTENT_ATTACHED = 1 << 0;
        /// Produce a signature that does not carry the content.
        const DETACHED_SIGNATURE = 1 << 1;
    }
}

impl SignFlags {
    /// Whether the two exclusive bits are both set.
    #[must_use]
    pub fn is_conflicting(self) -> bool {
        self.contains(Self::CONTENT_ATTACHED | Self::DETACHED_SIGNATURE)
    }

    #[must_use]
    pub fn is_detached(self) -> bool {
        self.contains(Self::DETACHED_SIGNATURE)
    }

    #[must_use]
    pub fn is_content_attached(self) -> bool {
        self.contains(Self::CONTENT_ATTACHED)
    }
}
