use crate::result::wire::ResultWire;

/// Outcome of one policy evaluation.
///
/// A skipped evaluation cannot carry violations; the enum leaves no room
/// for that state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    /// Violations in evaluation order. May be empty when built through
    /// `PolicyResult::fail` with no messages; it is still not a success.
    Failure(Vec<String>),
    Skipped(String),
}

/// A verdict plus the host-side `ignore` hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyResult {
    verdict: Verdict,
    ignore: bool,
}

impl PolicyResult {
    pub fn success() -> Self {
        Self::from_verdict(Verdict::Success)
    }

    pub fn fail<I, S>(violations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_verdict(Verdict::Failure(
            violations.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        Self::from_verdict(Verdict::Skipped(reason.into()))
    }

    pub fn from_verdict(verdict: Verdict) -> Self {
        Self {
            verdict,
            ignore: false,
        }
    }

    /// Asks the host not to enforce this result even if it fails.
    pub fn with_ignore(mut self, ignore: bool) -> Self {
        self.ignore = ignore;
        self
    }

    /// Appends a violation. No deduplication.
    ///
    /// A success becomes a failure. A skip also becomes a failure holding
    /// only this violation; the skip reason is discarded.
    pub fn add_violation(&mut self, message: impl Into<String>) {
        let message = message.into();
        match &mut self.verdict {
            Verdict::Failure(violations) => violations.push(message),
            Verdict::Success | Verdict::Skipped(_) => {
                self.verdict = Verdict::Failure(vec![message]);
            }
        }
    }

    pub fn has_violations(&self) -> bool {
        !self.violations().is_empty()
    }

    pub fn is_success(&self) -> bool {
        matches!(self.verdict, Verdict::Success)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.verdict, Verdict::Skipped(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.verdict, Verdict::Failure(_))
    }

    pub fn violations(&self) -> &[String] {
        match &self.verdict {
            Verdict::Failure(violations) => violations,
            Verdict::Success | Verdict::Skipped(_) => &[],
        }
    }

    /// Empty unless the result is a skip.
    pub fn skip_reason(&self) -> &str {
        match &self.verdict {
            Verdict::Skipped(reason) => reason,
            Verdict::Success | Verdict::Failure(_) => "",
        }
    }

    pub fn ignore(&self) -> bool {
        self.ignore
    }

    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// The fixed-shape output object.
    pub fn to_wire(&self) -> ResultWire {
        ResultWire {
            skipped: self.is_skipped(),
            violations: self.violations().to_vec(),
            skip_reason: self.skip_reason().to_string(),
            ignore: self.ignore,
        }
    }
}

impl From<Verdict> for PolicyResult {
    fn from(verdict: Verdict) -> Self {
        Self::from_verdict(verdict)
    }
}
