//! Types shared between the club backend and its clients.

/// Implements [`std::str::FromStr`] and [`std::fmt::Display`] for a
/// unit-only enum with fixed string names.
macro_rules! str_enum {
    ($t:ty { $($v:ident => $s:literal),* $(,)? }) => {
        impl $t {
            /// The stored name of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$v => $s,)*
                }
            }
        }

        impl std::str::FromStr for $t {
            type Err = $crate::UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$v),)*
                    _ => Err($crate::UnknownVariant(s.to_owned())),
                }
            }
        }

        impl std::fmt::Display for $t {
            #[inline]
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use str_enum;

pub mod account;
pub mod election;
pub mod gear;
pub mod membership;
pub mod session;

/// A string that does not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl std::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown variant \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownVariant {}
