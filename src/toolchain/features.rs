//! Feature bitmask reported by the compiler

use bitflags::bitflags;

bitflags! {
    /// CSS constructs the compiler found in a stylesheet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Features: u32 {
        /// `@apply` was used.
        const AT_APPLY = 1 << 0;
        /// A legacy JS plugin or config hook was loaded.
        const JS_PLUGIN_COMPAT = 1 << 1;
        /// `theme()` was called.
        const THEME_FUNCTION = 1 << 2;
        /// Utilities are generated (`@tailwind utilities`).
        const UTILITIES = 1 << 3;
        /// `@import` rules were inlined.
        const AT_IMPORT = 1 << 4;
    }
}

impl Default for Features {
    fn default() -> Self {
        Self::empty()
    }
}

impl Features {
    /// Features that require the stylesheet to be processed at all
    pub const RELEVANT: Features = Features::AT_APPLY
        .union(Features::JS_PLUGIN_COMPAT)
        .union(Features::THEME_FUNCTION)
        .union(Features::UTILITIES);

    /// Whether the stylesheet needs processing, as opposed to passthrough
    pub fn requires_processing(self) -> bool {
        self.intersects(Self::RELEVANT)
    }

    /// Whether the scanner has to run for this stylesheet
    pub fn generates_utilities(self) -> bool {
        self.contains(Self::UTILITIES)
    }
}
