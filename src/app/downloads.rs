//! Download action: count it, then hand the link to the system opener

use super::App;
use tracing::{info, warn};

impl App {
    /// The counter moves when the user asks, whether or not the browser
    /// ever completes the transfer.
    pub(crate) fn download_sheet(&mut self, id: &str) {
        let Some(href) = self.session.record_download(id, &self.catalog) else {
            warn!(id, "Download requested for unknown sheet");
            return;
        };

        match open::that_detached(&href) {
            Ok(()) => info!(id, href = %href, "Opened download link"),
            Err(e) => {
                warn!(id, href = %href, error = %e, "Failed to open download link");
                self.show_toast("Could not open the download link");
            }
        }
    }
}
