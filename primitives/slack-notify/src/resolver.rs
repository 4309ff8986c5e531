//! Channel name to id resolution over `conversations.list`.

use futures::{Stream, TryStreamExt, stream};
use std::pin::pin;
use tracing::debug;

use crate::config::strip_sigil;
use crate::error::NotifyError;
use crate::slack::{Channel, SlackApi};

/// Lazily walks `conversations.list`, yielding one page of channels at a time.
///
/// Nothing is requested until the stream is polled, and each page is fetched
/// only after the previous one has been consumed.
pub fn channel_pages<'a, A>(
    api: &'a A,
    types: &'a str,
) -> impl Stream<Item = Result<Vec<Channel>, NotifyError>> + 'a
where
    A: SlackApi + ?Sized,
{
    // `Some(cursor)` means another page is due; `None` means the listing is exhausted.
    stream::try_unfold(Some(None::<String>), move |state| async move {
        let Some(cursor) = state else {
            return Ok(None);
        };

        let page = api.list_conversations(types, cursor.as_deref()).await?;
        Ok::<_, NotifyError>(Some((page.channels, page.next_cursor.map(Some))))
    })
}

/// Finds the id of the first channel named exactly `name` (leading sigil ignored).
///
/// Returns `Ok(None)` when no page contains a match. Listing errors propagate.
pub async fn resolve_channel_id<A>(
    api: &A,
    name: &str,
    types: &str,
) -> Result<Option<String>, NotifyError>
where
    A: SlackApi + ?Sized,
{
    let name = strip_sigil(name);
    let mut pages = pin!(channel_pages(api, types));

    while let Some(channels) = pages.try_next().await? {
        if let Some(channel) = channels.into_iter().find(|c| c.name == name) {
            debug!(channel = %name, id = %channel.id, "resolved channel");
            return Ok(Some(channel.id));
        }
    }

    debug!(channel = %name, "no channel with that name");
    Ok(None)
}
