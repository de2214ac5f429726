//! Placement service - applies channel reconciliation to a guild's category
//!
//! Gathers the category's children with their records, asks the reconciler
//! for a plan, and carries it out through the platform.

use raid_core::reconcile::{self, ChannelMove, ReconcileContext, ReconcilePlan, Sibling};
use raid_core::{ChannelEdit, EventRecord, EventStoreExt, GuildConfig, Snowflake};
use tracing::{debug, error, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// What a sweep changed in one guild
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: usize,
    pub renamed: usize,
    pub moved: usize,
}

pub struct PlacementService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PlacementService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Reconciliation inputs for the current instant
    pub fn reconcile_context(&self, anchor: i32) -> ReconcileContext {
        ReconcileContext {
            anchor,
            now: self.ctx.now(),
            tz: self.ctx.tz(),
            expiry: self.ctx.expiry(),
        }
    }

    /// The category's anchor and its child channels paired with their records
    #[instrument(skip(self, config), fields(guild_id = %config.guild_id))]
    pub async fn gather_siblings(&self, config: &GuildConfig) -> ServiceResult<(i32, Vec<Sibling>)> {
        let channels = self.ctx.platform().guild_channels(config.guild_id).await?;
        let anchor = reconcile::anchor_for(channels.iter().find(|c| c.id == config.category_id));

        let mut siblings = Vec::new();
        for channel in channels
            .into_iter()
            .filter(|c| c.is_child_of(config.category_id))
        {
            let record = self.ctx.store().load::<EventRecord>(channel.id).await?;
            siblings.push(Sibling::new(channel, record));
        }

        debug!(anchor, count = siblings.len(), "Category children gathered");
        Ok((anchor, siblings))
    }

    pub async fn apply_moves(&self, moves: &[ChannelMove]) -> ServiceResult<()> {
        for mv in moves {
            debug!(channel_id = %mv.channel_id, from = mv.from, to = mv.to, "Moving channel");
            self.ctx
                .platform()
                .modify_channel(mv.channel_id, ChannelEdit::move_to(mv.to))
                .await?;
        }
        Ok(())
    }

    /// Expire, rename, then move
    pub async fn apply(&self, plan: &ReconcilePlan) -> ServiceResult<SweepReport> {
        for channel_id in &plan.expired {
            info!(channel_id = %channel_id, "Deleting expired event");
            match self.ctx.platform().delete_channel(*channel_id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    warn!(channel_id = %channel_id, "Expired channel already gone");
                }
                Err(e) => return Err(e.into()),
            }
            self.ctx.store().remove::<EventRecord>(*channel_id).await?;
        }

        for rename in &plan.renames {
            debug!(channel_id = %rename.channel_id, from = %rename.from, to = %rename.to, "Renaming channel");
            self.ctx
                .platform()
                .modify_channel(rename.channel_id, ChannelEdit::rename(rename.to.clone()))
                .await?;
        }

        self.apply_moves(&plan.moves).await?;

        Ok(SweepReport {
            expired: plan.expired.len(),
            renamed: plan.renames.len(),
            moved: plan.moves.len(),
        })
    }

    /// Re-sort the category by event date, nothing else
    #[instrument(skip(self, config), fields(guild_id = %config.guild_id))]
    pub async fn reorder(&self, config: &GuildConfig) -> ServiceResult<()> {
        let (anchor, siblings) = self.gather_siblings(config).await?;
        let moves = reconcile::plan_order(siblings, anchor);
        self.apply_moves(&moves).await
    }

    /// Full reconciliation of one guild. Unconfigured guilds are skipped.
    #[instrument(skip(self))]
    pub async fn sweep_guild(&self, guild_id: Snowflake) -> ServiceResult<Option<SweepReport>> {
        let Some(config) = self.ctx.store().load::<GuildConfig>(guild_id).await? else {
            debug!("Guild not configured, skipping");
            return Ok(None);
        };

        let (anchor, siblings) = self.gather_siblings(&config).await?;
        let plan = reconcile::plan(siblings, &self.reconcile_context(anchor));
        if plan.is_empty() {
            return Ok(Some(SweepReport::default()));
        }

        let report = self.apply(&plan).await?;
        info!(
            expired = report.expired,
            renamed = report.renamed,
            moved = report.moved,
            "Guild reconciled"
        );
        Ok(Some(report))
    }

    /// Sweep every guild the bot belongs to. One guild failing does not stop
    /// the others; only listing the guilds can fail the whole sweep.
    #[instrument(skip(self))]
    pub async fn sweep_all(&self) -> ServiceResult<usize> {
        let guilds = self.ctx.platform().guild_ids().await?;
        let mut swept = 0;

        for guild_id in guilds {
            match self.sweep_guild(guild_id).await {
                Ok(Some(_)) => swept += 1,
                Ok(None) => {}
                Err(e) => {
                    error!(guild_id = %guild_id, error = %e, "Background maintenance failed");
                }
            }
        }

        Ok(swept)
    }
}
