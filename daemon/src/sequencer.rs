//! Single-writer sequencer.
//!
//! One tokio task exclusively owns the engine together with the ledgers and
//! clock it runs against. Callers talk to it through a cloneable
//! [`SequencerHandle`]; every command is applied in arrival order, so concurrent
//! callers observe the same sequential semantics as direct `&mut` use.

use holo_governance::{GovernanceEngine, GovernanceEvent, Ledgers};
use holo_ledger::{MemoryToken, TokenSnapshot};
use holo_nullables::{NullClock, NullStore};
use holo_types::{
    AccountId, Amount, Clock, GovernanceParams, Proposal, ProposalId, StakeRecord,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::DaemonError;
use crate::scenario::{Scenario, Step};

/// What a successfully applied step produced, besides events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StepOutcome {
    Done,
    ProposalCreated { id: ProposalId },
    Reward { payout: Amount, fee: Amount },
    FeesCollected { amount: Amount },
}

/// End-of-run view of every proposal and both ledgers.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub now: u64,
    pub proposals: Vec<Proposal>,
    /// Stake records per proposal, indexed like `proposals`.
    pub stakes: Vec<Vec<(AccountId, StakeRecord)>>,
    pub retained_fees: Amount,
    pub vote_token: TokenSnapshot,
    pub stake_token: TokenSnapshot,
}

/// The engine plus the in-memory world it runs against.
pub struct Simulation {
    engine: GovernanceEngine,
    vote: Arc<MemoryToken>,
    stake: Arc<MemoryToken>,
    store: Arc<NullStore>,
    clock: Arc<NullClock>,
}

impl Simulation {
    pub fn new(
        params: GovernanceParams,
        escrow: AccountId,
        start_time: u64,
    ) -> Result<Self, DaemonError> {
        let vote = Arc::new(MemoryToken::new("VOTE"));
        let stake = Arc::new(MemoryToken::new("STAKE"));
        let store = Arc::new(NullStore::new());
        let clock = Arc::new(NullClock::new(start_time));
        let engine = GovernanceEngine::new(
            params,
            Ledgers {
                vote: vote.clone(),
                stake: stake.clone(),
            },
            store.clone(),
            clock.clone(),
            escrow,
        )?;
        Ok(Self {
            engine,
            vote,
            stake,
            store,
            clock,
        })
    }

    /// Mint the scenario's initial balances.
    pub fn seed(&mut self, scenario: &Scenario) -> Result<(), DaemonError> {
        for (holder, amount) in &scenario.vote_balances {
            self.vote.mint(&AccountId::new(holder.as_str()), *amount)?;
        }
        let escrow = self.engine.escrow_account().clone();
        for (holder, amount) in &scenario.stake_balances {
            let holder = AccountId::new(holder.as_str());
            self.stake.mint(&holder, *amount)?;
            self.stake.approve(&holder, &escrow, *amount);
        }
        tracing::info!(
            vote_holders = scenario.vote_balances.len(),
            stake_holders = scenario.stake_balances.len(),
            "scenario balances seeded"
        );
        Ok(())
    }

    pub fn apply(&mut self, step: Step) -> Result<StepOutcome, DaemonError> {
        let engine = &mut self.engine;
        let outcome = match step {
            Step::CreateProposal { creator, metadata } => {
                let id = engine.create_proposal(&AccountId::new(creator), metadata)?;
                StepOutcome::ProposalCreated { id }
            }
            Step::Vote {
                proposal,
                voter,
                support,
            } => {
                engine.vote(proposal, &AccountId::new(voter), support)?;
                StepOutcome::Done
            }
            Step::Stake {
                proposal,
                staker,
                amount,
                side,
            } => {
                engine.stake(proposal, &AccountId::new(staker), amount, side.into())?;
                StepOutcome::Done
            }
            Step::Unstake {
                proposal,
                staker,
                amount,
                side,
            } => {
                engine.unstake(proposal, &AccountId::new(staker), amount, side.into())?;
                StepOutcome::Done
            }
            Step::Boost { proposal } => {
                engine.boost_proposal(proposal)?;
                StepOutcome::Done
            }
            Step::Finalize { proposal } => {
                engine.finalize_proposal(proposal)?;
                StepOutcome::Done
            }
            Step::Expire { proposal } => {
                engine.expire_proposal(proposal)?;
                StepOutcome::Done
            }
            Step::WithdrawReward { proposal, staker } => {
                let payout = engine.withdraw_reward(proposal, &AccountId::new(staker))?;
                StepOutcome::Reward {
                    payout: payout.total,
                    fee: payout.fee,
                }
            }
            Step::CollectFees { to } => {
                let amount = engine.collect_fees(&AccountId::new(to))?;
                StepOutcome::FeesCollected { amount }
            }
            Step::Approve { owner, amount } => {
                self.stake
                    .approve(&AccountId::new(owner), engine.escrow_account(), amount);
                StepOutcome::Done
            }
            Step::MintVote { to, amount } => {
                self.vote.mint(&AccountId::new(to), amount)?;
                StepOutcome::Done
            }
            Step::BurnVote { from, amount } => {
                self.vote.burn(&AccountId::new(from), amount)?;
                StepOutcome::Done
            }
            Step::MintStake { to, amount } => {
                self.stake.mint(&AccountId::new(to), amount)?;
                StepOutcome::Done
            }
            Step::Advance { secs } => {
                self.clock.advance(secs);
                StepOutcome::Done
            }
        };
        Ok(outcome)
    }

    pub fn drain_events(&mut self) -> Vec<GovernanceEvent> {
        self.engine.drain_events()
    }

    pub fn report(&self) -> Result<Report, DaemonError> {
        let count = self.engine.num_proposals()?;
        let proposals = (0..count)
            .map(|id| self.engine.get_proposal(id))
            .collect::<Result<Vec<_>, _>>()?;
        let stakes = (0..count)
            .map(|id| self.engine.get_stakes(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Report {
            now: self.clock.now().as_secs(),
            proposals,
            stakes,
            retained_fees: self.engine.retained_fees()?,
            vote_token: self.vote.snapshot(),
            stake_token: self.stake.snapshot(),
        })
    }

    pub fn save_store(&self, path: &Path) -> Result<(), DaemonError> {
        Ok(self.store.save_to_file(path)?)
    }
}

enum Command {
    Seed {
        scenario: Box<Scenario>,
        reply: oneshot::Sender<Result<(), DaemonError>>,
    },
    Apply {
        step: Step,
        reply: oneshot::Sender<Result<StepOutcome, DaemonError>>,
    },
    DrainEvents {
        reply: oneshot::Sender<Vec<GovernanceEvent>>,
    },
    Report {
        reply: oneshot::Sender<Result<Report, DaemonError>>,
    },
    SaveStore {
        path: PathBuf,
        reply: oneshot::Sender<Result<(), DaemonError>>,
    },
}

/// Cloneable front door to the sequencer task.
#[derive(Clone)]
pub struct SequencerHandle {
    tx: mpsc::Sender<Command>,
}

/// Start the sequencer task. It stops once every handle is dropped.
pub fn spawn(simulation: Simulation, capacity: usize) -> (SequencerHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);
    let task = tokio::spawn(run(simulation, rx));
    (SequencerHandle { tx }, task)
}

async fn run(mut simulation: Simulation, mut rx: mpsc::Receiver<Command>) {
    tracing::debug!("sequencer started");
    while let Some(command) = rx.recv().await {
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            Command::Seed { scenario, reply } => {
                let _ = reply.send(simulation.seed(&scenario));
            }
            Command::Apply { step, reply } => {
                let _ = reply.send(simulation.apply(step));
            }
            Command::DrainEvents { reply } => {
                let _ = reply.send(simulation.drain_events());
            }
            Command::Report { reply } => {
                let _ = reply.send(simulation.report());
            }
            Command::SaveStore { path, reply } => {
                let _ = reply.send(simulation.save_store(&path));
            }
        }
    }
    tracing::debug!("sequencer stopped");
}

impl SequencerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, DaemonError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| DaemonError::SequencerStopped)?;
        response.await.map_err(|_| DaemonError::SequencerStopped)
    }

    pub async fn seed(&self, scenario: Scenario) -> Result<(), DaemonError> {
        self.request(|reply| Command::Seed {
            scenario: Box::new(scenario),
            reply,
        })
        .await?
    }

    pub async fn apply(&self, step: Step) -> Result<StepOutcome, DaemonError> {
        self.request(|reply| Command::Apply { step, reply }).await?
    }

    pub async fn drain_events(&self) -> Result<Vec<GovernanceEvent>, DaemonError> {
        self.request(|reply| Command::DrainEvents { reply }).await
    }

    pub async fn report(&self) -> Result<Report, DaemonError> {
        self.request(|reply| Command::Report { reply }).await?
    }

    pub async fn save_store(&self, path: PathBuf) -> Result<(), DaemonError> {
        self.request(|reply| Command::SaveStore { path, reply }).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holo_types::ProposalState;

    fn balance(snapshot: &TokenSnapshot, holder: &str) -> Amount {
        snapshot
            .balances
            .iter()
            .find(|(account, _)| account.as_str() == holder)
            .map(|(_, amount)| *amount)
            .unwrap_or(0)
    }

    fn demo() -> Scenario {
        Scenario::from_json_str(include_str!("../../demos/settlement.json")).unwrap()
    }

    async fn start() -> (SequencerHandle, JoinHandle<()>) {
        let scenario = demo();
        let simulation = Simulation::new(
            GovernanceParams::default(),
            AccountId::new("escrow"),
            scenario.start_time,
        )
        .unwrap();
        let (handle, task) = spawn(simulation, 4);
        handle.seed(scenario).await.unwrap();
        (handle, task)
    }

    #[tokio::test]
    async fn demo_scenario_settles() {
        let (handle, task) = start().await;
        let steps = demo().steps;
        let last = steps.len() - 1;

        for (i, step) in steps.into_iter().enumerate() {
            let result = handle.apply(step).await;
            if i == last {
                // c staked on the losing side.
                assert!(matches!(result, Err(DaemonError::Governance(_))));
            } else {
                result.unwrap();
            }
        }

        let report = handle.report().await.unwrap();
        assert_eq!(report.proposals[0].state, ProposalState::Resolved);
        assert_eq!(balance(&report.stake_token, "a"), 1_050);
        assert_eq!(balance(&report.stake_token, "b"), 1_050);
        assert_eq!(balance(&report.stake_token, "c"), 900);
        assert_eq!(balance(&report.stake_token, "escrow"), 0);

        let stakes = &report.stakes[0];
        assert_eq!(stakes.len(), 3);
        assert_eq!(stakes[0].0.as_str(), "a");
        assert_eq!(stakes[0].1.upstake, 0);
        assert_eq!(stakes[2].1.downstake, 100);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn events_are_drained_in_order() {
        let (handle, _task) = start().await;
        let outcome = handle
            .apply(Step::CreateProposal {
                creator: "a".into(),
                metadata: "m".into(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, StepOutcome::ProposalCreated { id: 0 });

        handle
            .apply(Step::Vote {
                proposal: 0,
                voter: "d".into(),
                support: false,
            })
            .await
            .unwrap();

        let events = handle.drain_events().await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GovernanceEvent::ProposalCreated { .. }));
        assert!(matches!(events[1], GovernanceEvent::VoteCasted { .. }));
        assert!(handle.drain_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_handles_share_one_writer() {
        let (handle, _task) = start().await;
        handle
            .apply(Step::CreateProposal {
                creator: "a".into(),
                metadata: String::new(),
            })
            .await
            .unwrap();

        let mut joins = Vec::new();
        for voter in ["a", "b", "c"] {
            let handle = handle.clone();
            joins.push(tokio::spawn(async move {
                handle
                    .apply(Step::Vote {
                        proposal: 0,
                        voter: voter.into(),
                        support: true,
                    })
                    .await
            }));
        }
        for join in joins {
            join.await.unwrap().unwrap();
        }

        let report = handle.report().await.unwrap();
        assert_eq!(report.proposals[0].yea, 3);
    }

    #[tokio::test]
    async fn store_snapshot_is_written() {
        let (handle, _task) = start().await;
        handle
            .apply(Step::CreateProposal {
                creator: "a".into(),
                metadata: String::new(),
            })
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.bin");
        handle.save_store(path.clone()).await.unwrap();

        let restored = NullStore::load_from_file(&path).unwrap();
        assert_eq!(restored.snapshot().proposals.len(), 1);
    }

    #[tokio::test]
    async fn stopped_sequencer_reports_error() {
        let (handle, task) = start().await;
        task.abort();
        let _ = task.await;
        assert!(matches!(
            handle.report().await,
            Err(DaemonError::SequencerStopped)
        ));
    }
}
