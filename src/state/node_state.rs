use std::fmt;

/// Lifecycle of a single crawl tree node within one walk
///
/// `Unvisited -> Expanding -> Forked -> Joined`. A node that is cut short by
/// cancellation goes straight from `Unvisited` or `Expanding` to `Joined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Created from a discovered link, not yet walked
    Unvisited,

    /// Links of the node are being discovered
    Expanding,

    /// Children were indexed and their sub-walks spawned
    Forked { children: usize },

    /// Every sub-walk of this node has completed
    Joined,
}

impl NodeState {
    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_advance_to(&self, next: &NodeState) -> bool {
        matches!(
            (self, next),
            (Self::Unvisited, Self::Expanding)
                | (Self::Expanding, Self::Forked { .. })
                | (Self::Forked { .. }, Self::Joined)
                | (Self::Unvisited, Self::Joined)
                | (Self::Expanding, Self::Joined)
        )
    }

    /// Returns true once the node and its whole sub-tree are done
    pub fn is_joined(&self) -> bool {
        matches!(self, Self::Joined)
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unvisited => write!(f, "unvisited"),
            Self::Expanding => write!(f, "expanding"),
            Self::Forked { children } => write!(f, "forked({})", children),
            Self::Joined => write!(f, "joined"),
        }
    }
}
