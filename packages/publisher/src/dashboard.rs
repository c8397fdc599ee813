use serde::Serialize;
use tracing::debug;

use crate::common::UserId;
use crate::error::StoreResult;
use crate::grouping::group;
use crate::stats::{aggregate, ContentStats};
use crate::traits::{RecordFilter, RecordStore};
use crate::types::GroupedContent;

/// What the content page renders: the filtered grouped view plus all-time
/// stats.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub view: GroupedContent,
    pub stats: ContentStats,
}

/// Load the grouped view for `filter` and stats over the user's whole history.
///
/// Stats never depend on the filter; with an unfiltered request the store is
/// queried once.
pub async fn load_dashboard(
    store: &dyn RecordStore,
    user_id: UserId,
    filter: &RecordFilter,
) -> StoreResult<Dashboard> {
    let filtered = store.fetch_records(user_id, filter).await?;

    let stats = if filter.is_unfiltered() {
        aggregate(&filtered)
    } else {
        let all = store.fetch_records(user_id, &RecordFilter::all()).await?;
        aggregate(&all)
    };

    let view = group(&filtered);
    debug!(
        %user_id,
        groups = view.groups.len(),
        standalone = view.standalone.len(),
        total_generated = stats.total_generated,
        "Loaded dashboard"
    );

    Ok(Dashboard { view, stats })
}
