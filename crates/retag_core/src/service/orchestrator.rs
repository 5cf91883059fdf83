//! Drives substitution instructions end-to-end.
//!
//! # Responsibility
//! - Resolve, mutate and register for one instruction before starting the next.
//! - Keep per-tagging and per-edition failures inside their own boundary.
//!
//! # Invariants
//! - Phases only move forward: `Resolving -> Mutating -> Registering -> Done`.
//! - Only owners whose mutation completed contribute editions to registration.
//! - Nothing already committed is rolled back.

use crate::error::RetagResult;
use crate::model::edition::{Edition, EditionId};
use crate::model::instruction::SubstitutionInstruction;
use crate::model::remark::User;
use crate::model::tagging::{TaggingAction, TaggingId};
use crate::repo::edition_repo::EditionRepository;
use crate::repo::remark_repo::RemarkRepository;
use crate::repo::tagging_repo::TaggingRepository;
use crate::service::mutator::{MutationError, RemarkDisposition, TaggingMutator};
use crate::service::registrar::PublicationRegistrar;
use crate::service::resolver::TaggingResolver;
use log::{error, info, warn};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Per-instruction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationPhase {
    Resolving,
    Mutating,
    Registering,
    Done,
}

impl Display for ReconciliationPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Resolving => "resolving",
            Self::Mutating => "mutating",
            Self::Registering => "registering",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Repositories the orchestrator reads and writes.
#[derive(Clone, Copy)]
pub struct RetagStores<'a> {
    pub taggings: &'a dyn TaggingRepository,
    pub editions: &'a dyn EditionRepository,
    pub remarks: &'a dyn RemarkRepository,
}

/// Counts and failures for one processed instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstructionReport {
    pub instruction: SubstitutionInstruction,
    /// All taggings on the source topic, orphans included.
    pub taggings_found: usize,
    pub orphaned: usize,
    /// Distinct published editions seen before mutation.
    pub published_found: usize,
    pub removed: usize,
    pub changed: usize,
    pub remarks_added: usize,
    pub remarks_skipped: usize,
    pub failed_taggings: Vec<(TaggingId, String)>,
    pub registered: Vec<EditionId>,
    /// Keyed by the published edition, or by the mutated owner when its
    /// published edition could not be looked up.
    pub failed_registrations: Vec<(EditionId, String)>,
    pub dry_run: bool,
}

impl InstructionReport {
    fn new(instruction: &SubstitutionInstruction, dry_run: bool) -> Self {
        Self {
            instruction: instruction.clone(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn mutated(&self) -> usize {
        self.removed + self.changed
    }
}

/// Aggregated result of a run over a whole change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: Uuid,
    pub instructions: Vec<InstructionReport>,
}

impl RunReport {
    pub fn mutated(&self) -> usize {
        self.instructions.iter().map(InstructionReport::mutated).sum()
    }

    pub fn failures(&self) -> usize {
        self.instructions
            .iter()
            .map(|report| report.failed_taggings.len() + report.failed_registrations.len())
            .sum()
    }
}

pub struct RetagOrchestrator<'a> {
    stores: RetagStores<'a>,
    registrar: PublicationRegistrar<'a>,
    author: User,
    run_id: Uuid,
    dry_run: bool,
}

impl<'a> RetagOrchestrator<'a> {
    /// Creates an orchestrator; `author` must already be resolved.
    pub fn new(stores: RetagStores<'a>, registrar: PublicationRegistrar<'a>, author: User) -> Self {
        Self {
            stores,
            registrar,
            author,
            run_id: Uuid::new_v4(),
            dry_run: false,
        }
    }

    /// Resolve and report only; skips mutation and registration.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Processes every instruction in order.
    ///
    /// # Errors
    /// Stops at the first run-level failure; earlier instructions stay applied.
    pub fn run(&self, instructions: &[SubstitutionInstruction]) -> RetagResult<RunReport> {
        info!(
            "event=run_start module=orchestrator status=start run_id={} instructions={} dry_run={}",
            self.run_id,
            instructions.len(),
            self.dry_run
        );

        let mut reports = Vec::with_capacity(instructions.len());
        for instruction in instructions {
            reports.push(self.process(instruction)?);
        }

        let report = RunReport {
            run_id: self.run_id,
            instructions: reports,
        };
        info!(
            "event=run_finish module=orchestrator status=ok run_id={} mutated={} failures={}",
            self.run_id,
            report.mutated(),
            report.failures()
        );
        Ok(report)
    }

    /// Processes one instruction through resolve, mutate and register.
    pub fn process(&self, instruction: &SubstitutionInstruction) -> RetagResult<InstructionReport> {
        let mut report = InstructionReport::new(instruction, self.dry_run);
        let resolver = TaggingResolver::new(self.stores.taggings, self.stores.editions);

        self.enter(ReconciliationPhase::Resolving, instruction);
        if instruction.source_topic_id == instruction.destination_topic_id {
            warn!(
                "event=instruction_same_topic module=orchestrator status=warn run_id={} topic={}",
                self.run_id, instruction.source_topic_id
            );
        }
        let resolved = resolver.resolve_affected(instruction)?;
        let published = resolver.published_editions(resolved.live.iter().map(|a| &a.edition))?;
        report.taggings_found = resolved.total();
        report.orphaned = resolved.orphaned.len();
        report.published_found = published.len();
        info!(
            "event=instruction_start module=orchestrator status=start run_id={} source={} destination={} taggings={} published={} detail=\"Updating {} taggings of editions ({} published) to change {} to {}\"",
            self.run_id,
            instruction.source_topic_id,
            instruction.destination_topic_id,
            report.taggings_found,
            report.published_found,
            report.taggings_found,
            report.published_found,
            instruction.source_topic_id,
            instruction.destination_topic_id
        );

        for orphan in &resolved.orphaned {
            info!(
                "event=tagging_skip module=orchestrator status=skip reason=missing_edition tagging_id={} edition_id={} detail=\" - no edition (probably deleted)\"",
                orphan.id, orphan.edition_id
            );
        }

        if self.dry_run {
            self.enter(ReconciliationPhase::Done, instruction);
            return Ok(report);
        }

        self.enter(ReconciliationPhase::Mutating, instruction);
        let mutator = TaggingMutator::new(
            self.stores.taggings,
            self.stores.editions,
            self.stores.remarks,
            &self.author,
        );
        let mut mutated_owners: Vec<Edition> = Vec::new();
        for affected in &resolved.live {
            match mutator.apply(&affected.tagging, instruction) {
                Ok(outcome) => {
                    count_action(&mut report, outcome.action);
                    match outcome.remark {
                        RemarkDisposition::Added(_) => report.remarks_added += 1,
                        RemarkDisposition::SkippedFrozen
                        | RemarkDisposition::SkippedMissingEdition => report.remarks_skipped += 1,
                    }
                    if let Some(edition) = outcome.edition {
                        mutated_owners.push(edition);
                    }
                }
                Err(MutationError::Remark {
                    tagging_id,
                    edition,
                    action,
                    source,
                }) => {
                    count_action(&mut report, action);
                    error!(
                        "event=remark_add module=orchestrator status=error run_id={} tagging_id={tagging_id} edition_id={} error={source}",
                        self.run_id, edition.id
                    );
                    report
                        .failed_taggings
                        .push((tagging_id, format!("remark not recorded: {source}")));
                    mutated_owners.push(edition);
                }
                Err(err) => {
                    warn!(
                        "event=tagging_mutate module=orchestrator status=error run_id={} tagging_id={} error={err}",
                        self.run_id,
                        err.tagging_id()
                    );
                    report.failed_taggings.push((err.tagging_id(), err.to_string()));
                }
            }
        }

        self.enter(ReconciliationPhase::Registering, instruction);
        let mut seen: HashSet<EditionId> = HashSet::new();
        for owner in &mutated_owners {
            let target = match resolver.published_edition_for(owner) {
                Ok(Some(target)) => target,
                Ok(None) => continue,
                Err(err) => {
                    error!(
                        "event=published_lookup module=orchestrator status=error run_id={} edition_id={} document_id={} error={err}",
                        self.run_id, owner.id, owner.document_id
                    );
                    report
                        .failed_registrations
                        .push((owner.id, format!("published edition lookup failed: {err}")));
                    continue;
                }
            };
            if !seen.insert(target.id) {
                continue;
            }
            match self.register_one(&target) {
                Ok(()) => report.registered.push(target.id),
                Err(message) => {
                    error!(
                        "event=edition_register module=orchestrator status=error run_id={} edition_id={} slug={} error={message}",
                        self.run_id, target.id, target.slug
                    );
                    report.failed_registrations.push((target.id, message));
                }
            }
        }

        self.enter(ReconciliationPhase::Done, instruction);
        info!(
            "event=instruction_finish module=orchestrator status=ok run_id={} source={} destination={} removed={} changed={} failed={} registered={} registration_failures={}",
            self.run_id,
            instruction.source_topic_id,
            instruction.destination_topic_id,
            report.removed,
            report.changed,
            report.failed_taggings.len(),
            report.registered.len(),
            report.failed_registrations.len()
        );
        Ok(report)
    }

    /// Reloads and registers one edition; every failure is returned as text.
    fn register_one(&self, target: &Edition) -> Result<(), String> {
        let fresh = self
            .stores
            .editions
            .get_edition(target.id)
            .map_err(|err| format!("reload failed: {err}"))?
            .ok_or_else(|| "edition disappeared before registration".to_string())?;
        self.registrar
            .register(&fresh)
            .map_err(|err| err.to_string())
    }

    fn enter(&self, phase: ReconciliationPhase, instruction: &SubstitutionInstruction) {
        info!(
            "event=phase_enter module=orchestrator status=ok run_id={} phase={phase} instruction=\"{instruction}\"",
            self.run_id
        );
    }
}

fn count_action(report: &mut InstructionReport, action: TaggingAction) {
    match action {
        TaggingAction::Removed => report.removed += 1,
        TaggingAction::Changed => report.changed += 1,
    }
}
