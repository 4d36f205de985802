//! # packrs tar Diagnostic Classifier (`common::archive::diagnostics`)
//!
//! File: cli/src/common/archive/diagnostics.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/packrs
//!
//! ## Overview
//!
//! `tar --diff` reports every mismatch between an archive and the filesystem
//! as one line of free text. This module sorts those lines into
//! [`DifferenceKind`]s and decides which of them mean the archive is stale.
//!
//! ## Suppression rules
//!
//! Some differences will be overwritten by the pack step anyway, so they must
//! not mark the archive as stale:
//!
//! | Kind | Kept when |
//! |---|---|
//! | `Owner` | running as root AND no owner override |
//! | `Group` | running as root AND no group override |
//! | `Mode` | no mode override |
//! | `ModTime`, `MissingFile`, `MissingArchive`, `Untracked` | always |
//!
//! A non-root run cannot record arbitrary owners in the first place, so uid and
//! gid mismatches only count for root.
//!
//! Lines matching no pattern are dropped. The archive counts as up to date iff
//! nothing survives.
//!
//! ## Membership
//!
//! `tar --diff` only visits members that are already in the archive, so a file
//! added to the source since the last pack produces no line at all. A report
//! that looks up to date is therefore completed by a membership check: every
//! name the create run would write ([`untracked_entries`]) must be listed in the
//! archive. Only a report whose membership check completed can confirm that
//! the archive is current ([`DifferenceReport::confirms_up_to_date`]).
//!
//! ## Dialect
//!
//! The patterns match GNU tar's wording under the `C` locale. They live in a
//! single table ([`DIFF_PATTERNS`]) so a new tar dialect means new rows, not
//! new code.
//!
use crate::common::archive::policy::OwnershipPolicy;
use crate::common::process::ExecutionResult;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

/// A category of archive/filesystem mismatch reported by tar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceKind {
    Owner,
    Group,
    Mode,
    ModTime,
    /// A file in the archive no longer exists on disk.
    MissingFile,
    /// The archive itself could not be opened because it does not exist.
    MissingArchive,
    /// A path the create run would write is not in the archive.
    Untracked,
}

/// Suffix pattern table, checked in order; the first match wins.
static DIFF_PATTERNS: Lazy<Vec<(Regex, DifferenceKind)>> = Lazy::new(|| {
    [
        (r": Uid differs$", DifferenceKind::Owner),
        (r": Gid differs$", DifferenceKind::Group),
        (r": Mode differs$", DifferenceKind::Mode),
        (r": Mod time differs$", DifferenceKind::ModTime),
        (
            r": Warning: Cannot stat: No such file or directory$",
            DifferenceKind::MissingFile,
        ),
        (
            r": Cannot open: No such file or directory$",
            DifferenceKind::MissingArchive,
        ),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).expect("diff pattern is valid"), kind))
    .collect()
});

/// One diagnostic line that survived suppression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difference {
    pub kind: DifferenceKind,
    pub line: String,
}

/// Returns the category of a diagnostic line, if it is one tar uses for mismatches.
pub fn classify_line(line: &str) -> Option<DifferenceKind> {
    DIFF_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(line))
        .map(|(_, kind)| *kind)
}

/// Whether a difference of `kind` still matters once `policy` is applied.
fn is_meaningful(kind: DifferenceKind, elevated: bool, policy: &OwnershipPolicy) -> bool {
    match kind {
        DifferenceKind::Owner => elevated && policy.owner().is_none(),
        DifferenceKind::Group => elevated && policy.group().is_none(),
        DifferenceKind::Mode => policy.mode().is_none(),
        DifferenceKind::ModTime
        | DifferenceKind::MissingFile
        | DifferenceKind::MissingArchive
        | DifferenceKind::Untracked => true,
    }
}

/// Keeps the lines that represent a meaningful difference, in input order.
pub fn meaningful_differences<'a, I>(
    lines: I,
    elevated: bool,
    policy: &OwnershipPolicy,
) -> Vec<Difference>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter_map(|line| classify_line(line).map(|kind| (kind, line)))
        .filter(|(kind, _)| is_meaningful(*kind, elevated, policy))
        .map(|(kind, line)| Difference {
            kind,
            line: line.to_string(),
        })
        .collect()
}

fn member_name(line: &str) -> &str {
    line.trim_end_matches('/')
}

/// Names in `planned` (the create run's listing) missing from `listed` (the
/// archive's listing), in `planned` order. Directory entries match with or
/// without their trailing `/`.
pub fn untracked_entries<'a, L, P>(listed: L, planned: P) -> Vec<Difference>
where
    L: IntoIterator<Item = &'a str>,
    P: IntoIterator<Item = &'a str>,
{
    let archived: HashSet<&str> = listed
        .into_iter()
        .map(member_name)
        .filter(|name| !name.is_empty())
        .collect();
    planned
        .into_iter()
        .map(member_name)
        .filter(|name| !name.is_empty() && !archived.contains(name))
        .map(|name| Difference {
            kind: DifferenceKind::Untracked,
            line: format!("{}: Not in archive", name),
        })
        .collect()
}

/// Whether the archive's member list was compared with the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipCheck {
    /// Skipped because the compare run already found the archive stale or did not finish.
    NotRun,
    Complete,
    /// Listing the archive or the source failed.
    Failed,
}

/// The classified outcome of one compare run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifferenceReport {
    /// True iff no meaningful difference was found.
    pub archived: bool,
    /// Surviving diagnostic lines, each newline-terminated.
    #[serde(rename = "out")]
    pub filtered: String,
    pub differences: Vec<Difference>,
    pub rc: i32,
    pub stdout: String,
    pub stderr: String,
    pub cmd: String,
    pub membership: MembershipCheck,
}

impl DifferenceReport {
    /// Classifies stdout then stderr of a compare run.
    pub fn classify(result: ExecutionResult, elevated: bool, policy: &OwnershipPolicy) -> Self {
        let differences = meaningful_differences(result.lines(), elevated, policy);
        let filtered = differences
            .iter()
            .map(|d| format!("{}\n", d.line))
            .collect::<String>();
        Self {
            archived: differences.is_empty(),
            filtered,
            differences,
            rc: result.rc,
            stdout: result.stdout,
            stderr: result.stderr,
            cmd: result.cmd,
            membership: MembershipCheck::NotRun,
        }
    }

    /// Records the outcome of the membership check. Untracked entries are
    /// meaningful differences and clear `archived`.
    pub fn record_membership(&mut self, check: MembershipCheck, untracked: Vec<Difference>) {
        for difference in untracked {
            self.filtered.push_str(&difference.line);
            self.filtered.push('\n');
            self.differences.push(difference);
        }
        self.archived = self.differences.is_empty();
        self.membership = check;
    }

    /// GNU tar exits 0 (same) or 1 (differences) after a complete comparison;
    /// anything else means the comparison itself did not finish.
    pub fn is_conclusive(&self) -> bool {
        matches!(self.rc, 0 | 1)
    }

    /// True only when the compare finished, found nothing that matters, and
    /// every path the create run would write is already in the archive.
    pub fn confirms_up_to_date(&self) -> bool {
        self.archived && self.is_conclusive() && self.membership == MembershipCheck::Complete
    }
}
