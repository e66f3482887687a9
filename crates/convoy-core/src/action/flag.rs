/// Tri-state policy flag resolved along the owner chain.
///
/// A flag left at `Inherit` takes the value already resolved by the
/// enclosing lists; at the root of the chain each policy falls back to
/// its stated default (see [`ActionContext::root`](super::ActionContext::root)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flag {
    /// Explicitly enabled, regardless of the owner chain
    On,
    /// Explicitly disabled, regardless of the owner chain
    Off,
    /// Take the value resolved by the enclosing lists
    #[default]
    Inherit,
}

impl Flag {
    /// Resolve against the value inherited from the owner chain.
    pub fn resolve(self, inherited: bool) -> bool {
        match self {
            Flag::On => true,
            Flag::Off => false,
            Flag::Inherit => inherited,
        }
    }

    /// Resolve a whole owner chain, innermost flag first.
    ///
    /// The first explicit value wins; a chain of `Inherit` all the way up
    /// resolves to `default`. Pure function, independent of any object
    /// identity.
    pub fn resolve_chain(chain: &[Flag], default: bool) -> bool {
        for flag in chain {
            match flag {
                Flag::On => return true,
                Flag::Off => return false,
                Flag::Inherit => {}
            }
        }
        default
    }
}

impl From<Option<bool>> for Flag {
    /// `None` means the flag was not specified and inherits.
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Flag::On,
            Some(false) => Flag::Off,
            None => Flag::Inherit,
        }
    }
}
