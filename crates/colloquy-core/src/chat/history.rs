//! History assembly: persisted turns -> provider context.

use colloquy_types::error::StoreError;
use colloquy_types::provider::ProviderExchange;
use colloquy_types::thread::ThreadId;

use crate::store::turn::TurnWork;

/// Maps a thread's persisted turns to provider exchanges.
pub struct HistoryAssembler;

impl HistoryAssembler {
    /// Every turn of the thread, oldest first, as question/answer pairs.
    ///
    /// Unbounded on purpose: the full thread goes to the provider, with
    /// no cap and no summarization. Degraded answers that were persisted
    /// by earlier turns are included verbatim.
    pub async fn assemble<W: TurnWork>(
        work: &mut W,
        thread_id: &ThreadId,
    ) -> Result<Vec<ProviderExchange>, StoreError> {
        let turns = work.thread_turns(thread_id).await?;

        Ok(turns
            .into_iter()
            .map(|chat| ProviderExchange {
                question: chat.question,
                answer: chat.answer,
            })
            .collect())
    }
}
