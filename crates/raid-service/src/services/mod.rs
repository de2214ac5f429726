//! Business logic services
//!
//! Each service borrows the [`ServiceContext`] and performs one family of
//! operations. Mutating operations are only ever called from queued tasks.

pub mod context;
pub mod declaration;
pub mod error;
pub mod event;
pub mod guild;
pub mod permission;
pub mod placement;
pub mod roster;

pub use context::{Caller, EmojiMap, ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use declaration::{DeclarationService, Publish};
pub use error::{Denial, ServiceError, ServiceResult, SOMETHING_WENT_WRONG};
pub use event::EventService;
pub use guild::GuildService;
pub use permission::PermissionService;
pub use placement::{PlacementService, SweepReport};
pub use roster::RosterService;
