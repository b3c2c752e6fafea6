use serde::{Deserialize, Serialize};

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Identifier handed out when the collection is empty.
            pub const FIRST: Self = Self(1);

            /// Next identifier after the current maximum of a collection.
            ///
            /// `None` means the id space is exhausted.
            pub fn after(last: Option<Self>) -> Option<Self> {
                match last {
                    None => Some(Self::FIRST),
                    Some(Self(id)) => id.checked_add(1).map(Self),
                }
            }

            pub fn value(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

sequential_id!(
    /// Department identifier, global sequence.
    DepartmentId
);
sequential_id!(
    /// Allowance-change application identifier, global sequence.
    ApplicationId
);
sequential_id!(
    /// Expenditure identifier, sequenced per owning department.
    ExpenditureId
);
sequential_id!(
    /// Expense history identifier, global sequence.
    ExpenseId
);
