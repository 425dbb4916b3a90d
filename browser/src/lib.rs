//! Headless core of the stacks migration browser: a lazily-loaded folder and
//! asset tree backed by a remote hierarchy service, with cancellation-safe
//! concurrent fetching, server-assisted filtering, recursive lazy selection,
//! and inline cell editing. No UI or transport dependencies live here; the
//! TUI renders the model and `stacks-client` supplies the HTTP service.

mod browser;
pub mod cache;
pub mod coordinator;
pub mod edit;
pub mod events;
pub mod filter;
pub mod generation;
pub mod node;
mod selection;
pub mod service;
pub mod tree;
pub mod vocab;

pub use browser::Browser;
pub use browser::TreeSnapshot;
pub use cache::HierarchyCache;
pub use cache::LoadSlot;
pub use coordinator::FetchCoordinator;
pub use coordinator::SearchOutcome;
pub use events::BrowserEvent;
pub use events::EventSender;
pub use filter::FilterPhase;
pub use filter::FilterPredicate;
pub use filter::FilterState;
pub use generation::Generation;
pub use node::AssetFields;
pub use node::FolderFields;
pub use node::NodeKey;
pub use node::NodeKind;
pub use node::ParentKey;
pub use node::TreeNode;
pub use service::HierarchyService;
pub use tree::FilterMode;
pub use tree::RowView;
pub use tree::SortSpec;
pub use tree::TreeModel;
pub use vocab::Vocabularies;
