//! Issue transition engine.
//!
//! Decides whether a create or edit request is legal and, if so, produces
//! the next record state. The engine is pure: owner existence comes from a
//! [`UserLookup`] and time from the caller, and nothing is written until
//! every field of the request has been validated.
//!
//! Rules enforced here:
//! - terminal issues (`COMPLETED`, `CANCELLED`) accept no edits;
//! - `IN_PROGRESS` and `COMPLETED` require an owner;
//! - clearing the owner returns the issue to `PENDING`;
//! - assigning an owner to a `PENDING` issue starts it (`IN_PROGRESS`);
//! - an explicit status in the same patch suppresses both side effects and
//!   is checked against the owner the issue will have after the patch.

use chrono::Duration;

use crate::error::CoreError;
use crate::issue::{Issue, IssueDraft, IssuePatch, NewIssue, Revision};
use crate::status::{IssueStatus, MSG_INVALID_STATUS};
use crate::types::{DbId, Timestamp};
use crate::user::UserLookup;

pub const MSG_MISSING_TITLE: &str = "missing title";
pub const MSG_TERMINAL_IMMUTABLE: &str = "terminal issue immutable";
pub const MSG_STATUS_REQUIRES_OWNER: &str = "status requires owner";

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

/// Validate a creation request and build the initial record state.
///
/// The issue starts `IN_PROGRESS` when an owner is supplied and resolves,
/// otherwise `PENDING`.
pub fn create<L>(input: NewIssue, lookup: &L, now: Timestamp) -> Result<IssueDraft, CoreError>
where
    L: UserLookup + ?Sized,
{
    let title = validate_title(input.title)?;

    let owner_id = match input.owner_id {
        Some(id) => Some(resolve_owner(lookup, id)?),
        None => None,
    };

    Ok(IssueDraft {
        title,
        description: input.description,
        status: IssueStatus::initial(owner_id.is_some()),
        owner_id,
        created_at: now,
        updated_at: now,
    })
}

// ---------------------------------------------------------------------------
// apply_edit
// ---------------------------------------------------------------------------

/// Validate `patch` against `issue` and return the next record state.
///
/// On any rejection the caller's record is untouched; the returned error
/// names the violated rule.
pub fn apply_edit<L>(
    issue: &Issue,
    patch: &IssuePatch,
    lookup: &L,
    now: Timestamp,
) -> Result<Issue, CoreError>
where
    L: UserLookup + ?Sized,
{
    if issue.is_terminal() {
        return Err(CoreError::Conflict(MSG_TERMINAL_IMMUTABLE.to_string()));
    }

    let title = match &patch.title {
        Some(t) => validate_title(t.clone())?,
        None => issue.title.clone(),
    };

    let description = match &patch.description {
        Some(d) => d.clone(),
        None => issue.description.clone(),
    };

    let requested_status = match &patch.status {
        Some(Some(raw)) => Some(raw.parse::<IssueStatus>()?),
        Some(None) => return Err(CoreError::Validation(MSG_INVALID_STATUS.to_string())),
        None => None,
    };

    let owner_id = match patch.owner_id {
        Some(Some(id)) => Some(resolve_owner(lookup, id)?),
        Some(None) => None,
        None => issue.owner_id,
    };

    let status = match requested_status {
        Some(status) => {
            if status.requires_owner() && owner_id.is_none() {
                return Err(CoreError::Conflict(MSG_STATUS_REQUIRES_OWNER.to_string()));
            }
            status
        }
        None => match patch.owner_id {
            Some(None) => IssueStatus::Pending,
            Some(Some(_)) if issue.status == IssueStatus::Pending => IssueStatus::InProgress,
            _ => issue.status,
        },
    };

    Ok(issue.revise(Revision {
        title,
        description,
        status,
        owner_id,
        updated_at: next_updated_at(issue.updated_at, now),
    }))
}

// ---------------------------------------------------------------------------
// Read helpers
// ---------------------------------------------------------------------------

/// Turn a storage miss for issue `id` into the `NotFound` rejection.
pub fn found<T>(id: DbId, record: Option<T>) -> Result<T, CoreError> {
    record.ok_or(CoreError::issue_not_found(id))
}

/// Exact status match; `None` matches everything.
pub fn matches_filter(issue: &Issue, filter: Option<IssueStatus>) -> bool {
    filter.map_or(true, |s| issue.status == s)
}

/// Timestamp for an accepted edit: `now`, nudged forward when the clock
/// has not advanced past the previous update.
pub fn next_updated_at(previous: Timestamp, now: Timestamp) -> Timestamp {
    // Postgres `timestamptz` keeps microseconds, so step by one.
    let floor = previous + Duration::microseconds(1);
    if now < floor {
        floor
    } else {
        now
    }
}

fn validate_title(title: Option<String>) -> Result<String, CoreError> {
    match title {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(CoreError::Validation(MSG_MISSING_TITLE.to_string())),
    }
}

fn resolve_owner<L>(lookup: &L, id: DbId) -> Result<DbId, CoreError>
where
    L: UserLookup + ?Sized,
{
    lookup
        .lookup_user(id)
        .map(|u| u.id)
        .ok_or(CoreError::unknown_owner(id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;
    use crate::status::VALID_STATUSES;
    use crate::user::{sample_users, User};

    fn t0() -> Timestamp {
        chrono::Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn later(secs: i64) -> Timestamp {
        t0() + Duration::seconds(secs)
    }

    fn users() -> Vec<User> {
        sample_users()
    }

    fn issue(status: IssueStatus, owner_id: Option<DbId>) -> Issue {
        Issue {
            id: 10,
            title: "Fix bug".into(),
            description: Some("crash on save".into()),
            status,
            owner_id,
            created_at: t0(),
            updated_at: t0(),
        }
    }

    fn patch() -> IssuePatch {
        IssuePatch::default()
    }

    /// Active statuses need an owner; an ownerless issue is pending or cancelled.
    fn assert_owner_invariants(i: &Issue) {
        if i.status.requires_owner() {
            assert!(i.owner_id.is_some(), "{:?} without owner", i.status);
        }
        if i.owner_id.is_none() {
            assert!(
                matches!(i.status, IssueStatus::Pending | IssueStatus::Cancelled),
                "ownerless issue in {:?}",
                i.status
            );
        }
        assert!(i.updated_at >= i.created_at);
    }

    // -- create ---------------------------------------------------------------

    #[test]
    fn create_without_owner_is_pending() {
        let draft = create(
            NewIssue {
                title: Some("Fix bug".into()),
                ..Default::default()
            },
            users().as_slice(),
            t0(),
        )
        .unwrap();

        assert_eq!(draft.status, IssueStatus::Pending);
        assert_eq!(draft.owner_id, None);
        assert_eq!(draft.created_at, draft.updated_at);
    }

    #[test]
    fn create_with_owner_is_in_progress() {
        let draft = create(
            NewIssue {
                title: Some("Fix bug".into()),
                description: Some("details".into()),
                owner_id: Some(1),
            },
            users().as_slice(),
            t0(),
        )
        .unwrap();

        assert_eq!(draft.status, IssueStatus::InProgress);
        assert_eq!(draft.owner_id, Some(1));
        assert_eq!(draft.description.as_deref(), Some("details"));

        let issue = draft.into_issue(5);
        assert_eq!(issue.id, 5);
        assert_owner_invariants(&issue);
    }

    #[test]
    fn create_rejects_empty_or_missing_title() {
        for title in [None, Some(String::new()), Some("   ".into())] {
            let result = create(
                NewIssue {
                    title,
                    owner_id: Some(1),
                    ..Default::default()
                },
                users().as_slice(),
                t0(),
            );
            assert_matches!(result, Err(CoreError::Validation(msg)) if msg == MSG_MISSING_TITLE);
        }
    }

    #[test]
    fn create_rejects_unknown_owner() {
        let result = create(
            NewIssue {
                title: Some("Fix bug".into()),
                owner_id: Some(99),
                ..Default::default()
            },
            users().as_slice(),
            t0(),
        );
        assert_matches!(
            result,
            Err(CoreError::NotFound { entity: "Owner", id: 99 })
        );
    }

    // -- apply_edit: happy paths ---------------------------------------------

    #[test]
    fn owned_in_progress_issue_can_complete() {
        let current = issue(IssueStatus::InProgress, Some(1));
        let next = apply_edit(
            &current,
            &IssuePatch {
                status: Some(Some("COMPLETED".into())),
                ..patch()
            },
            users().as_slice(),
            later(5),
        )
        .unwrap();

        assert_eq!(next.status, IssueStatus::Completed);
        assert_eq!(next.owner_id, Some(1));
        assert_eq!(next.updated_at, later(5));
        assert_eq!(next.created_at, current.created_at);
    }

    #[test]
    fn title_and_description_edits_apply() {
        let current = issue(IssueStatus::Pending, None);
        let next = apply_edit(
            &current,
            &IssuePatch {
                title: Some(Some("Renamed".into())),
                description: Some(None),
                ..patch()
            },
            users().as_slice(),
            later(1),
        )
        .unwrap();

        assert_eq!(next.title, "Renamed");
        assert_eq!(next.description, None);
        assert_eq!(next.status, IssueStatus::Pending);
    }

    #[test]
    fn clearing_owner_returns_to_pending() {
        let current = issue(IssueStatus::InProgress, Some(1));
        let next = apply_edit(
            &current,
            &IssuePatch {
                owner_id: Some(None),
                ..patch()
            },
            users().as_slice(),
            later(1),
        )
        .unwrap();

        assert_eq!(next.status, IssueStatus::Pending);
        assert_eq!(next.owner_id, None);
    }

    #[test]
    fn assigning_owner_promotes_pending() {
        let current = issue(IssueStatus::Pending, None);
        let next = apply_edit(
            &current,
            &IssuePatch {
                owner_id: Some(Some(2)),
                ..patch()
            },
            users().as_slice(),
            later(1),
        )
        .unwrap();

        assert_eq!(next.status, IssueStatus::InProgress);
        assert_eq!(next.owner_id, Some(2));
    }

    #[test]
    fn reassigning_owner_keeps_in_progress() {
        let current = issue(IssueStatus::InProgress, Some(1));
        let next = apply_edit(
            &current,
            &IssuePatch {
                owner_id: Some(Some(3)),
                ..patch()
            },
            users().as_slice(),
            later(1),
        )
        .unwrap();

        assert_eq!(next.status, IssueStatus::InProgress);
        assert_eq!(next.owner_id, Some(3));
    }

    #[test]
    fn status_is_checked_against_owner_assigned_in_same_patch() {
        let current = issue(IssueStatus::Pending, None);
        let next = apply_edit(
            &current,
            &IssuePatch {
                status: Some(Some("COMPLETED".into())),
                owner_id: Some(Some(2)),
                ..patch()
            },
            users().as_slice(),
            later(1),
        )
        .unwrap();

        assert_eq!(next.status, IssueStatus::Completed);
        assert_eq!(next.owner_id, Some(2));
    }

    #[test]
    fn explicit_pending_suppresses_promotion() {
        let current = issue(IssueStatus::Pending, None);
        let next = apply_edit(
            &current,
            &IssuePatch {
                status: Some(Some("PENDING".into())),
                owner_id: Some(Some(2)),
                ..patch()
            },
            users().as_slice(),
            later(1),
        )
        .unwrap();

        assert_eq!(next.status, IssueStatus::Pending);
        assert_eq!(next.owner_id, Some(2));
    }

    #[test]
    fn explicit_cancel_with_owner_clear_is_honoured() {
        let current = issue(IssueStatus::InProgress, Some(1));
        let next = apply_edit(
            &current,
            &IssuePatch {
                status: Some(Some("CANCELLED".into())),
                owner_id: Some(None),
                ..patch()
            },
            users().as_slice(),
            later(1),
        )
        .unwrap();

        assert_eq!(next.status, IssueStatus::Cancelled);
        assert_eq!(next.owner_id, None);
    }

    #[test]
    fn pending_issue_without_owner_can_be_cancelled() {
        let current = issue(IssueStatus::Pending, None);
        let next = apply_edit(
            &current,
            &IssuePatch {
                status: Some(Some("CANCELLED".into())),
                ..patch()
            },
            users().as_slice(),
            later(1),
        )
        .unwrap();
        assert_eq!(next.status, IssueStatus::Cancelled);
    }

    #[test]
    fn empty_patch_only_touches_updated_at() {
        let current = issue(IssueStatus::InProgress, Some(1));
        let next = apply_edit(&current, &patch(), users().as_slice(), later(3)).unwrap();

        assert_eq!(next.title, current.title);
        assert_eq!(next.description, current.description);
        assert_eq!(next.status, current.status);
        assert_eq!(next.owner_id, current.owner_id);
        assert_eq!(next.updated_at, later(3));
    }

    // -- apply_edit: rejections ----------------------------------------------

    #[test]
    fn ownerless_issue_cannot_start() {
        let current = issue(IssueStatus::Pending, None);
        let result = apply_edit(
            &current,
            &IssuePatch {
                status: Some(Some("IN_PROGRESS".into())),
                ..patch()
            },
            users().as_slice(),
            later(1),
        );
        assert_matches!(
            result,
            Err(CoreError::Conflict(msg)) if msg == MSG_STATUS_REQUIRES_OWNER
        );
    }

    #[test]
    fn owner_clear_wins_over_explicit_active_status() {
        let current = issue(IssueStatus::InProgress, Some(1));
        for status in ["IN_PROGRESS", "COMPLETED"] {
            let result = apply_edit(
                &current,
                &IssuePatch {
                    status: Some(Some(status.into())),
                    owner_id: Some(None),
                    ..patch()
                },
                users().as_slice(),
                later(1),
            );
            assert_matches!(
                result,
                Err(CoreError::Conflict(msg)) if msg == MSG_STATUS_REQUIRES_OWNER
            );
        }
    }

    #[test]
    fn terminal_issues_reject_every_patch_shape() {
        let patches = [
            IssuePatch {
                title: Some(Some("new".into())),
                ..patch()
            },
            IssuePatch {
                description: Some(Some("d".into())),
                ..patch()
            },
            IssuePatch {
                status: Some(Some("PENDING".into())),
                ..patch()
            },
            IssuePatch {
                status: Some(Some("bogus".into())),
                ..patch()
            },
            IssuePatch {
                owner_id: Some(None),
                ..patch()
            },
            IssuePatch {
                owner_id: Some(Some(99)),
                ..patch()
            },
            patch(),
        ];

        for current in [
            issue(IssueStatus::Completed, Some(1)),
            issue(IssueStatus::Cancelled, None),
            issue(IssueStatus::Cancelled, Some(2)),
        ] {
            for p in &patches {
                let result = apply_edit(&current, p, users().as_slice(), later(1));
                assert_matches!(
                    result,
                    Err(CoreError::Conflict(msg)) if msg == MSG_TERMINAL_IMMUTABLE
                );
            }
        }
    }

    #[test]
    fn invalid_status_token_is_validation_error() {
        let current = issue(IssueStatus::Pending, None);
        let result = apply_edit(
            &current,
            &IssuePatch {
                title: Some(Some("would change".into())),
                status: Some(Some("DONE".into())),
                ..patch()
            },
            users().as_slice(),
            later(1),
        );
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg == "invalid status");
    }

    #[test]
    fn empty_replacement_title_is_rejected() {
        let current = issue(IssueStatus::Pending, None);
        let result = apply_edit(
            &current,
            &IssuePatch {
                title: Some(Some(String::new())),
                ..patch()
            },
            users().as_slice(),
            later(1),
        );
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg == MSG_MISSING_TITLE);
    }

    #[test]
    fn null_title_is_rejected() {
        let current = issue(IssueStatus::Pending, None);
        let result = apply_edit(
            &current,
            &IssuePatch {
                title: Some(None),
                ..patch()
            },
            users().as_slice(),
            later(1),
        );
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg == MSG_MISSING_TITLE);
    }

    #[test]
    fn null_status_is_rejected() {
        let current = issue(IssueStatus::InProgress, Some(1));
        let result = apply_edit(
            &current,
            &IssuePatch {
                status: Some(None),
                owner_id: Some(Some(2)),
                ..patch()
            },
            users().as_slice(),
            later(1),
        );
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg == MSG_INVALID_STATUS);
    }

    #[test]
    fn unknown_owner_is_not_found() {
        let current = issue(IssueStatus::Pending, None);
        let result = apply_edit(
            &current,
            &IssuePatch {
                owner_id: Some(Some(42)),
                ..patch()
            },
            users().as_slice(),
            later(1),
        );
        assert_matches!(result, Err(CoreError::NotFound { entity: "Owner", id: 42 }));
    }

    // -- timestamps -------------------------------------------------------------

    #[test]
    fn updated_at_strictly_increases_with_stalled_clock() {
        let current = issue(IssueStatus::Pending, None);
        let first = apply_edit(&current, &patch(), users().as_slice(), t0()).unwrap();
        assert!(first.updated_at > current.updated_at);

        let second = apply_edit(&first, &patch(), users().as_slice(), t0()).unwrap();
        assert!(second.updated_at > first.updated_at);
    }

    #[test]
    fn next_updated_at_prefers_now_when_ahead() {
        assert_eq!(next_updated_at(t0(), later(10)), later(10));
        assert_eq!(
            next_updated_at(later(10), t0()),
            later(10) + Duration::microseconds(1)
        );
    }

    // -- reads --------------------------------------------------------------------

    #[test]
    fn found_maps_miss_to_not_found() {
        assert_matches!(
            found::<Issue>(7, None),
            Err(CoreError::NotFound { entity: "Issue", id: 7 })
        );
        let i = issue(IssueStatus::Pending, None);
        assert_eq!(found(10, Some(i.clone())).unwrap(), i);
    }

    #[test]
    fn filter_matches_exact_status() {
        let i = issue(IssueStatus::InProgress, Some(1));
        assert!(matches_filter(&i, None));
        assert!(matches_filter(&i, Some(IssueStatus::InProgress)));
        assert!(!matches_filter(&i, Some(IssueStatus::Pending)));
    }

    // -- invariant preservation -----------------------------------------------

    /// Walk every patch in a small grid from every reachable state, several
    /// levels deep, checking that accepted edits keep the lifecycle rules and rejected ones
    /// leave the input untouched.
    #[test]
    fn invariants_hold_across_edit_sequences() {
        let mut grid = Vec::new();
        let statuses: Vec<Option<Option<String>>> = [None, Some(None)]
            .into_iter()
            .chain(VALID_STATUSES.iter().map(|s| Some(Some(s.to_string()))))
            .collect();
        let owners = [None, Some(None), Some(Some(1)), Some(Some(2)), Some(Some(99))];
        for status in &statuses {
            for owner in owners {
                grid.push(IssuePatch {
                    status: status.clone(),
                    owner_id: owner,
                    ..patch()
                });
            }
        }

        let lookup = users();
        let mut frontier = vec![
            create(
                NewIssue {
                    title: Some("a".into()),
                    ..Default::default()
                },
                lookup.as_slice(),
                t0(),
            )
            .unwrap()
            .into_issue(1),
            create(
                NewIssue {
                    title: Some("b".into()),
                    owner_id: Some(1),
                    ..Default::default()
                },
                lookup.as_slice(),
                t0(),
            )
            .unwrap()
            .into_issue(2),
        ];

        for depth in 0..3 {
            let mut next_frontier = Vec::new();
            for current in &frontier {
                assert_owner_invariants(current);
                for p in &grid {
                    let before = current.clone();
                    match apply_edit(current, p, lookup.as_slice(), later(depth)) {
                        Ok(next) => {
                            assert!(!before.is_terminal(), "edited a terminal issue");
                            assert!(next.updated_at > before.updated_at);
                            assert_eq!(next.created_at, before.created_at);
                            assert_eq!(next.id, before.id);
                            assert_owner_invariants(&next);
                            if !next.is_terminal() {
                                next_frontier.push(next);
                            }
                        }
                        Err(_) => assert_eq!(*current, before),
                    }
                }
            }
            next_frontier.dedup_by(|a, b| a.status == b.status && a.owner_id == b.owner_id);
            frontier = next_frontier;
        }
    }
}
