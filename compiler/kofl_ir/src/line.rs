use std::fmt;

/// 1-based source line. `Line::SYNTHETIC` (0) marks nodes that have no
/// source position, such as builtins and synthesized returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Line(u32);

impl Line {
    pub const SYNTHETIC: Line = Line(0);

    #[inline]
    pub const fn new(line: u32) -> Self {
        Line(line)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_synthetic(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            f.write_str("<native>")
        } else {
            write!(f, "line {}", self.0)
        }
    }
}
