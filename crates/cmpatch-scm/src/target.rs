//! What to review: a changeset or a branch.

use std::fmt;

use crate::error::{ScmError, ScmResult};

const CHANGESET_PREFIX: &str = "cs:";

/// The scope of a review diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffTarget {
    /// A single changeset, by number.
    Changeset(i64),
    /// Every change on a branch, e.g. `br:/main/task001`.
    Branch(String),
}

impl DiffTarget {
    /// Interpret command-line arguments.
    ///
    /// A lone `cs:<number>` names a changeset (the number is normalized,
    /// so `cs:007` is changeset 7). Anything else names a branch by its
    /// first argument.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> ScmResult<Self> {
        let first = args.first().ok_or(ScmError::MissingTarget)?.as_ref();
        if args.len() == 1 {
            if let Some(number) = changeset_number(first) {
                return Ok(Self::Changeset(number));
            }
        }
        Ok(Self::Branch(first.to_string()))
    }

    /// Revision ranges have no meaning for `cm`; only changesets and
    /// branches can be reviewed.
    pub fn from_revision_range(range: &str) -> ScmResult<Self> {
        Err(ScmError::Unsupported(format!(
            "revision range {range:?}: only reviews of a changeset or branch are supported"
        )))
    }

    /// The argument passed to `cm diff`.
    pub fn to_cm_arg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DiffTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Changeset(n) => write!(f, "{CHANGESET_PREFIX}{n}"),
            Self::Branch(name) => f.write_str(name),
        }
    }
}

fn changeset_number(arg: &str) -> Option<i64> {
    arg.strip_prefix(CHANGESET_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changeset_argument() {
        assert_eq!(DiffTarget::from_args(&["cs:1234"]).unwrap(), DiffTarget::Changeset(1234));
        assert_eq!(DiffTarget::from_args(&["cs:007"]).unwrap().to_cm_arg(), "cs:7");
    }

    #[test]
    fn non_numeric_changeset_is_a_branch() {
        assert_eq!(
            DiffTarget::from_args(&["cs:abc"]).unwrap(),
            DiffTarget::Branch("cs:abc".into())
        );
    }

    #[test]
    fn branch_argument() {
        let t = DiffTarget::from_args(&["br:/main/task001"]).unwrap();
        assert_eq!(t, DiffTarget::Branch("br:/main/task001".into()));
        assert_eq!(t.to_cm_arg(), "br:/main/task001");
    }

    #[test]
    fn several_arguments_use_the_first_as_branch() {
        let t = DiffTarget::from_args(&["cs:12", "extra"]).unwrap();
        assert_eq!(t, DiffTarget::Branch("cs:12".into()));
    }

    #[test]
    fn no_arguments() {
        let none: [&str; 0] = [];
        assert!(matches!(DiffTarget::from_args(&none), Err(ScmError::MissingTarget)));
    }

    #[test]
    fn revision_ranges_are_rejected() {
        assert!(matches!(
            DiffTarget::from_revision_range("cs:1:cs:5"),
            Err(ScmError::Unsupported(_))
        ));
    }
}
