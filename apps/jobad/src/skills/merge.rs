//! Interactive Merge Engine — walks a cleaned proposal with a human reviewer.
//!
//! `MergeEngine::step` is a pure transition: it takes the reviewer's answer to the
//! pending prompt (if any) and returns the next prompt, or `Step::Finished`. All
//! terminal I/O lives behind the `Prompter` passed to `run_review`.
//!
//! States: `AwaitingStart → ReviewingKey* → Finalizing → Done`, with `Aborted`
//! reachable from `AwaitingStart` only through a "no" to the opening prompt.
//! Every decision is applied to working copies of both stores; nothing touches
//! disk here.

use std::fmt;

use tracing::{info, warn};

use crate::console::Prompter;
use crate::errors::AppError;
use crate::skills::blacklist::Blacklist;
use crate::skills::proposal::DuplicateProposal;
use crate::skills::synonyms::{MergeOutcome, SynonymMap};

/// A yes/no question for the reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    StartSession { groups: usize },
    NewGroup { canonical: String },
    SameSkill { canonical: String, duplicate: String },
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::StartSession { groups } => {
                write!(f, "Start reviewing {groups} proposed skill groups?")
            }
            Prompt::NewGroup { canonical } => {
                write!(f, "Add new skill group named '{canonical}'?")
            }
            Prompt::SameSkill {
                canonical,
                duplicate,
            } => write!(f, "Is '{duplicate}' the same skill as '{canonical}'?"),
        }
    }
}

/// Position inside the current proposal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Key,
    Duplicate(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingStart,
    ReviewingKey { entry: usize, cursor: Cursor },
    Finalizing,
    Done,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Ask(Prompt),
    Finished,
}

/// Audit trail entry: one per skipped, accepted or rejected item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    SkippedRejectedKey { canonical: String },
    /// The proposal key is already a synonym of `owner`, so its whole entry is skipped.
    SkippedSynonymKey { canonical: String, owner: String },
    AcceptedGroup { canonical: String },
    RejectedGroup { canonical: String },
    SkippedRejectedDuplicate { canonical: String, duplicate: String },
    SkippedKnownSynonym { canonical: String, duplicate: String, owner: String },
    /// The duplicate is a canonical name and stays one.
    SkippedCanonicalDuplicate { canonical: String, duplicate: String },
    AcceptedDuplicate { canonical: String, duplicate: String },
    /// The reviewer said yes but the synonym map refused the pair.
    RefusedDuplicate { canonical: String, duplicate: String, outcome: MergeOutcome },
    RejectedDuplicate { canonical: String, duplicate: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTally {
    pub new_groups: usize,
    pub new_duplicates: usize,
    pub rejected_keys: usize,
    pub rejected_duplicates: usize,
}

/// Working copies plus everything that happened during the session.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub synonyms: SynonymMap,
    pub blacklist: Blacklist,
    pub tally: SessionTally,
    pub decisions: Vec<Decision>,
    pub aborted: bool,
}

impl SessionOutcome {
    /// The synonym map is written only when a group or duplicate was accepted.
    pub fn synonyms_changed(&self) -> bool {
        !self.aborted && (self.tally.new_groups > 0 || self.tally.new_duplicates > 0)
    }

    /// Rejections are persisted even when nothing was accepted.
    pub fn blacklist_changed(&self) -> bool {
        !self.aborted && (self.tally.rejected_keys > 0 || self.tally.rejected_duplicates > 0)
    }
}

pub struct MergeEngine {
    entries: Vec<(String, Vec<String>)>,
    synonyms: SynonymMap,
    blacklist: Blacklist,
    state: SessionState,
    pending: Option<Prompt>,
    tally: SessionTally,
    decisions: Vec<Decision>,
}

impl MergeEngine {
    pub fn new(proposal: DuplicateProposal, synonyms: SynonymMap, blacklist: Blacklist) -> Self {
        Self {
            entries: proposal.into_iter().collect(),
            synonyms,
            blacklist,
            state: SessionState::AwaitingStart,
            pending: None,
            tally: SessionTally::default(),
            decisions: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Applies `answer` to the pending prompt, then runs until the next prompt or the end.
    /// With a prompt pending and no answer, the same prompt is returned again.
    /// An answer with nothing pending is ignored.
    pub fn step(&mut self, answer: Option<bool>) -> Step {
        if let Some(prompt) = self.pending.take() {
            match answer {
                Some(yes) => self.apply(prompt, yes),
                None => {
                    self.pending = Some(prompt.clone());
                    return Step::Ask(prompt);
                }
            }
        }
        self.advance()
    }

    /// Hands back the working copies. Anything short of `Done` counts as aborted.
    pub fn finish(self) -> SessionOutcome {
        SessionOutcome {
            aborted: self.state != SessionState::Done,
            synonyms: self.synonyms,
            blacklist: self.blacklist,
            tally: self.tally,
            decisions: self.decisions,
        }
    }

    fn apply(&mut self, prompt: Prompt, yes: bool) {
        match (prompt, self.state) {
            (Prompt::StartSession { .. }, SessionState::AwaitingStart) => {
                self.state = if yes {
                    SessionState::ReviewingKey {
                        entry: 0,
                        cursor: Cursor::Key,
                    }
                } else {
                    info!("🛑 Review cancelled, nothing will be written");
                    SessionState::Aborted
                };
            }
            (Prompt::NewGroup { canonical }, SessionState::ReviewingKey { entry, .. }) => {
                if yes {
                    self.synonyms.ensure_group(&canonical);
                    self.tally.new_groups += 1;
                    info!("✅ New skill group '{canonical}'");
                    self.record(Decision::AcceptedGroup { canonical });
                    self.state = SessionState::ReviewingKey {
                        entry,
                        cursor: Cursor::Duplicate(0),
                    };
                } else {
                    self.blacklist.reject_key(&canonical);
                    self.tally.rejected_keys += 1;
                    info!("❌ Blacklisted skill group '{canonical}'");
                    self.record(Decision::RejectedGroup { canonical });
                    self.state = next_entry(entry);
                }
            }
            (
                Prompt::SameSkill {
                    canonical,
                    duplicate,
                },
                SessionState::ReviewingKey {
                    entry,
                    cursor: Cursor::Duplicate(index),
                },
            ) => {
                if yes {
                    match self.synonyms.merge_duplicate(&canonical, &duplicate) {
                        MergeOutcome::Added => {
                            self.tally.new_duplicates += 1;
                            info!("✅ '{duplicate}' is now a synonym of '{canonical}'");
                            self.record(Decision::AcceptedDuplicate {
                                canonical,
                                duplicate,
                            });
                        }
                        MergeOutcome::AlreadyPresent => {
                            info!("'{duplicate}' was already a synonym of '{canonical}'");
                            self.record(Decision::SkippedKnownSynonym {
                                owner: canonical.clone(),
                                canonical,
                                duplicate,
                            });
                        }
                        outcome => {
                            warn!("Not merging '{duplicate}' into '{canonical}': {outcome:?}");
                            self.record(Decision::RefusedDuplicate {
                                canonical,
                                duplicate,
                                outcome,
                            });
                        }
                    }
                } else {
                    self.blacklist.reject_duplicate(&canonical, &duplicate);
                    self.tally.rejected_duplicates += 1;
                    info!("❌ Blacklisted '{duplicate}' as a synonym of '{canonical}'");
                    self.record(Decision::RejectedDuplicate {
                        canonical,
                        duplicate,
                    });
                }
                self.state = SessionState::ReviewingKey {
                    entry,
                    cursor: Cursor::Duplicate(index + 1),
                };
            }
            (prompt, state) => {
                // Unreachable through `step`: `pending` is only set together with its state.
                warn!("Ignoring answer to {prompt:?} in state {state:?}");
            }
        }
    }

    fn advance(&mut self) -> Step {
        loop {
            match self.state {
                SessionState::AwaitingStart => {
                    return self.ask(Prompt::StartSession {
                        groups: self.entries.len(),
                    });
                }
                SessionState::ReviewingKey { entry, .. } if entry >= self.entries.len() => {
                    self.state = SessionState::Finalizing;
                }
                SessionState::ReviewingKey {
                    entry,
                    cursor: Cursor::Key,
                } => {
                    let canonical = self.entries[entry].0.clone();
                    if self.blacklist.is_key_rejected(&canonical) {
                        info!("⏭️  Skipping blacklisted skill group '{canonical}'");
                        self.record(Decision::SkippedRejectedKey { canonical });
                        self.state = next_entry(entry);
                    } else if let Some(owner) = self.synonyms.owner_of(&canonical) {
                        let owner = owner.to_string();
                        info!("⏭️  Skipping skill group '{canonical}': already a synonym of '{owner}'");
                        self.record(Decision::SkippedSynonymKey { canonical, owner });
                        self.state = next_entry(entry);
                    } else if !self.synonyms.contains_canonical(&canonical) {
                        return self.ask(Prompt::NewGroup { canonical });
                    } else {
                        self.state = SessionState::ReviewingKey {
                            entry,
                            cursor: Cursor::Duplicate(0),
                        };
                    }
                }
                SessionState::ReviewingKey {
                    entry,
                    cursor: Cursor::Duplicate(index),
                } => {
                    let (canonical, duplicates) = &self.entries[entry];
                    let Some(duplicate) = duplicates.get(index) else {
                        self.state = next_entry(entry);
                        continue;
                    };
                    let (canonical, duplicate) = (canonical.clone(), duplicate.clone());
                    let skip_to = SessionState::ReviewingKey {
                        entry,
                        cursor: Cursor::Duplicate(index + 1),
                    };

                    if self.blacklist.is_duplicate_rejected(&canonical, &duplicate) {
                        info!("⏭️  Skipping blacklisted pair '{duplicate}' → '{canonical}'");
                        self.record(Decision::SkippedRejectedDuplicate {
                            canonical,
                            duplicate,
                        });
                        self.state = skip_to;
                    } else if self.synonyms.contains_canonical(&duplicate) {
                        info!("⏭️  Skipping '{duplicate}': it is a skill group of its own");
                        self.record(Decision::SkippedCanonicalDuplicate {
                            canonical,
                            duplicate,
                        });
                        self.state = skip_to;
                    } else if let Some(owner) = self.synonyms.owner_of(&duplicate) {
                        let owner = owner.to_string();
                        info!("⏭️  Skipping '{duplicate}': already a synonym of '{owner}'");
                        self.record(Decision::SkippedKnownSynonym {
                            canonical,
                            duplicate,
                            owner,
                        });
                        self.state = skip_to;
                    } else {
                        return self.ask(Prompt::SameSkill {
                            canonical,
                            duplicate,
                        });
                    }
                }
                SessionState::Finalizing => {
                    self.state = SessionState::Done;
                    return Step::Finished;
                }
                SessionState::Done | SessionState::Aborted => return Step::Finished,
            }
        }
    }

    fn ask(&mut self, prompt: Prompt) -> Step {
        self.pending = Some(prompt.clone());
        Step::Ask(prompt)
    }

    fn record(&mut self, decision: Decision) {
        self.decisions.push(decision);
    }
}

fn next_entry(entry: usize) -> SessionState {
    SessionState::ReviewingKey {
        entry: entry + 1,
        cursor: Cursor::Key,
    }
}

/// Drives `engine` to completion, one blocking question at a time, then closes
/// the prompter. A prompter error ends the session with nothing to persist.
pub fn run_review(
    mut engine: MergeEngine,
    prompter: &mut dyn Prompter,
) -> Result<SessionOutcome, AppError> {
    let mut answer = None;
    loop {
        match engine.step(answer) {
            Step::Ask(prompt) => answer = Some(prompter.ask(&prompt.to_string())?),
            Step::Finished => break,
        }
    }
    prompter.close();
    Ok(engine.finish())
}
