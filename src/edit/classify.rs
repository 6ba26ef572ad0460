use crate::edit::align::{EditOp, OpKind};

/// Composition of an operation sequence, used to pick instructional text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpMix {
    NoOp,
    InsertOnly,
    DeleteOnly,
    ReplaceOnly,
    Mixed,
}

impl OpMix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoOp => "no_op",
            Self::InsertOnly => "insert_only",
            Self::DeleteOnly => "delete_only",
            Self::ReplaceOnly => "replace_only",
            Self::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for OpMix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify<T>(ops: &[EditOp<T>]) -> OpMix {
    let Some(first) = ops.first().map(EditOp::kind) else {
        return OpMix::NoOp;
    };
    if ops.iter().any(|op| op.kind() != first) {
        return OpMix::Mixed;
    }
    match first {
        OpKind::Insert => OpMix::InsertOnly,
        OpKind::Delete => OpMix::DeleteOnly,
        OpKind::Replace => OpMix::ReplaceOnly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::align::align_str;

    #[test]
    fn empty_is_no_op() {
        assert_eq!(classify::<char>(&[]), OpMix::NoOp);
        assert_eq!(classify(&align_str("SAME", "SAME").ops), OpMix::NoOp);
    }

    #[test]
    fn single_kind_sequences() {
        assert_eq!(classify(&align_str("AC", "ABCD").ops), OpMix::InsertOnly);
        assert_eq!(classify(&align_str("ABCD", "AD").ops), OpMix::DeleteOnly);
        assert_eq!(classify(&align_str("ABCD", "XBCY").ops), OpMix::ReplaceOnly);
    }

    #[test]
    fn two_kinds_are_mixed() {
        // delete 'A' then insert 'D'
        assert_eq!(classify(&align_str("ABC", "BCD").ops), OpMix::Mixed);
        assert_eq!(classify(&align_str("XY", "YXZ").ops), OpMix::Mixed);
    }

    #[test]
    fn serialized_tags_match_display() {
        for mix in [
            OpMix::NoOp,
            OpMix::InsertOnly,
            OpMix::DeleteOnly,
            OpMix::ReplaceOnly,
            OpMix::Mixed,
        ] {
            let json = serde_json::to_string(&mix).unwrap();
            assert_eq!(json, format!("\"{mix}\""));
        }
    }
}
