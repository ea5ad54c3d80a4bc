//! Output suffix patterns declared by signaturelets.
//!
//! A pattern maps the state of one request flag to the suffix used to name
//! the signature file when no explicit output path is given. A suffix string
//! starts with an operator character followed by the suffix body; `+` means
//! "append the body verbatim to the input path".
//!
//! Resolution scans the list in declaration order and stops at the first
//! pattern whose flag test yields a suffix (first match, not best match).

use crate::domain::flags::SignFlags;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Operator character for [`SuffixOperator::Append`].
pub const APPEND_OPERATOR: char = '+';

/// Why a suffix pattern list was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuffixPatternError {
    #[error("suffix pattern list is empty")]
    Empty,

    #[error("suffix pattern {index} must be specified with a non-empty flag")]
    MissingFlag { index: usize },

    #[error("suffix pattern {index} must specify a suffix in either the set or the unset case")]
    MissingSuffix { index: usize },

    #[error("unsupported operator character {operator:?} in suffix pattern {index} ({suffix:?})")]
    UnsupportedOperator {
        index: usize,
        operator: Option<char>,
        suffix: String,
    },

    #[error("suffix body too short in suffix pattern {index} ({suffix:?})")]
    EmptySuffix { index: usize, suffix: String },
}

/// One entry of a signaturelet's suffix pattern list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixPattern {
    pub flag: SignFlags,
    pub suffix_if_flag_set: Option<String>,
    pub suffix_if_flag_unset: Option<String>,
}

impl SuffixPattern {
    #[must_use]
    pub fn new(flag: SignFlags, if_set: Option<&str>, if_unset: Option<&str>) -> Self {
        Self {
            flag,
            suffix_if_flag_set: if_set.map(str::to_string),
            suffix_if_flag_unset: if_unset.map(str::to_string),
        }
    }

    /// The suffix this pattern yields for `flags`, if any.
    #[must_use]
    pub fn suffix_for(&self, flags: SignFlags) -> Option<&str> {
        if self.flag.intersects(flags) {
            self.suffix_if_flag_set.as_deref()
        } else {
            self.suffix_if_flag_unset.as_deref()
        }
    }
}

/// Operation a suffix applies to the input path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixOperator {
    Append,
}

/// A parsed suffix string, ready to derive output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixRule {
    operator: SuffixOperator,
    body: String,
}

impl SuffixRule {
    /// Parse a suffix string such as `"+.p7a"`.
    pub fn parse(suffix: &str) -> Result<Self, SuffixPatternError> {
        Self::parse_at(0, suffix)
    }

    fn parse_at(index: usize, suffix: &str) -> Result<Self, SuffixPatternError> {
        let mut chars = suffix.chars();
        match chars.next() {
            Some(APPEND_OPERATOR) => {
                let body = chars.as_str();
                if body.is_empty() {
                    return Err(SuffixPatternError::EmptySuffix {
                        index,
                        suffix: suffix.to_string(),
                    });
                }
                Ok(Self {
                    operator: SuffixOperator::Append,
                    body: body.to_string(),
                })
            }
            operator => Err(SuffixPatternError::UnsupportedOperator {
                index,
                operator,
                suffix: suffix.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn operator(&self) -> SuffixOperator {
        self.operator
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Derive the output path for `input`.
    #[must_use]
    pub fn apply(&self, input: &Path) -> PathBuf {
        match self.operator {
            SuffixOperator::Append => {
                let mut path = OsString::from(input.as_os_str());
                path.push(&self.body);
                PathBuf::from(path)
            }
        }
    }
}

/// Validate a suffix pattern list at registration time.
///
/// Every entry needs a non-empty flag, at least one suffix string, and each
/// present suffix must parse as a [`SuffixRule`].
pub fn validate_suffix_patterns(patterns: &[SuffixPattern]) -> Result<(), SuffixPatternError> {
    if patterns.is_empty() {
        return Err(SuffixPatternError::Empty);
    }

    for (index, pattern) in patterns.iter().enumerate() {
        if pattern.flag.is_empty() {
            return Err(SuffixPatternError::MissingFlag { index });
        }

        if pattern.suffix_if_flag_set.is_none() && pattern.suffix_if_flag_unset.is_none() {
            return Err(SuffixPatternError::MissingSuffix { index });
        }

        for suffix in [&pattern.suffix_if_flag_set, &pattern.suffix_if_flag_unset]
            .into_iter()
            .flatten()
        {
            SuffixRule::parse_at(index, suffix)?;
        }
    }

    Ok(())
}

/// First-match resolution of `flags` against `patterns`.
#[must_use]
pub fn resolve_suffix(patterns: &[SuffixPattern], flags: SignFlags) -> Option<&str> {
    patterns.iter().find_map(|p| p.suffix_for(flags))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seloader_patterns() -> Vec<SuffixPattern> {
        vec![
            SuffixPattern::new(SignFlags::DETACHED_SIGNATURE, Some("+.p7s"), None),
            SuffixPattern::new(SignFlags::CONTENT_ATTACHED, Some("+.p7a"), Some("+.p7a")),
        ]
    }

    #[test]
    fn accepts_well_formed_patterns() {
        assert_eq!(validate_suffix_patterns(&seloader_patterns()), Ok(()));
    }

    #[test]
    fn rejects_each_malformed_rule() {
        assert_eq!(validate_suffix_patterns(&[]), Err(SuffixPatternError::Empty));

        let missing_flag = [SuffixPattern::new(SignFlags::empty(), Some("+.sig"), None)];
        assert_eq!(
            validate_suffix_patterns(&missing_flag),
            Err(SuffixPatternError::MissingFlag { index: 0 })
        );

        let missing_suffix = [
            SuffixPattern::new(SignFlags::DETACHED_SIGNATURE, Some("+.p7s"), None),
            SuffixPattern::new(SignFlags::CONTENT_ATTACHED, None, None),
        ];
        assert_eq!(
            validate_suffix_patterns(&missing_suffix),
            Err(SuffixPatternError::MissingSuffix { index: 1 })
        );

        let bad_operator = [SuffixPattern::new(SignFlags::CONTENT_ATTACHED, None, Some("-.p7a"))];
        assert!(matches!(
            validate_suffix_patterns(&bad_operator),
            Err(SuffixPatternError::UnsupportedOperator {
                index: 0,
                operator: Some('-'),
                ..
            })
        ));

        let empty_string = [SuffixPattern::new(SignFlags::CONTENT_ATTACHED, Some(""), None)];
        assert!(matches!(
            validate_suffix_patterns(&empty_string),
            Err(SuffixPatternError::UnsupportedOperator { operator: None, .. })
        ));

        let empty_body = [SuffixPattern::new(SignFlags::CONTENT_ATTACHED, Some("+"), None)];
        assert!(matches!(
            validate_suffix_patterns(&empty_body),
            Err(SuffixPatternError::EmptySuffix { index: 0, .. })
        ));
    }

    #[test]
    fn resolution_is_first_match() {
        let patterns = seloader_patterns();
        assert_eq!(resolve_suffix(&patterns, SignFlags::empty()), Some("+.p7a"));
        assert_eq!(
            resolve_suffix(&patterns, SignFlags::DETACHED_SIGNATURE),
            Some("+.p7s")
        );
        assert_eq!(
            resolve_suffix(&patterns, SignFlags::CONTENT_ATTACHED),
            Some("+.p7a")
        );

        // Both entries would match; the first one wins.
        let overlapping = [
            SuffixPattern::new(SignFlags::CONTENT_ATTACHED, Some("+.first"), None),
            SuffixPattern::new(SignFlags::CONTENT_ATTACHED, Some("+.second"), None),
        ];
        assert_eq!(
            resolve_suffix(&overlapping, SignFlags::CONTENT_ATTACHED),
            Some("+.first")
        );
    }

    #[test]
    fn resolution_without_match_is_none() {
        let patterns = [SuffixPattern::new(SignFlags::DETACHED_SIGNATURE, Some("+.p7s"), None)];
        assert_eq!(resolve_suffix(&patterns, SignFlags::empty()), None);
        assert_eq!(resolve_suffix(&patterns, SignFlags::CONTENT_ATTACHED), None);
    }

    #[test]
    fn append_rule_derives_output_path() {
        let rule = SuffixRule::parse("+.p7a").unwrap();
        assert_eq!(rule.operator(), SuffixOperator::Append);
        assert_eq!(rule.body(), ".p7a");
        assert_eq!(
            rule.apply(Path::new("/tmp/out/a.bin")),
            PathBuf::from("/tmp/out/a.bin.p7a")
        );
    }
}
