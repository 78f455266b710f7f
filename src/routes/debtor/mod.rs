mod handler;
mod model;

pub use handler::handle;
pub use model::{Debtor, GlobalDebtor, GroupDebtor, ResolveDebtorRequest, UpsertDebtorRequest};
