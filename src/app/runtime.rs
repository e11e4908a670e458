use super::messages::Message;
use super::state::Reader;
use super::update::Effect;
use crate::cancellation::CancellationToken;
use crate::scroll_map::LayoutProvider;
use crate::service::{MutationService, TextSource};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Drives a [`Reader`] against blocking services: runs fetch, save and
/// layout effects, feeds their results back as messages and hands the
/// presentation effects (panel alignment, notices) to the caller.
pub struct Runtime<L: LayoutProvider, S: TextSource, M: MutationService> {
    reader: Reader<L>,
    source: S,
    mutations: M,
}

impl<L: LayoutProvider, S: TextSource, M: MutationService> Runtime<L, S, M> {
    pub fn new(reader: Reader<L>, source: S, mutations: M) -> Self {
        Self {
            reader,
            source,
            mutations,
        }
    }

    pub fn reader(&self) -> &Reader<L> {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut Reader<L> {
        &mut self.reader
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn mutations(&self) -> &M {
        &self.mutations
    }

    pub fn into_reader(self) -> Reader<L> {
        self.reader
    }

    pub fn dispatch(&mut self, message: Message) -> Vec<Effect> {
        let mut queue = VecDeque::from([message]);
        let mut presentation = Vec::new();

        while let Some(message) = queue.pop_front() {
            for effect in self.reader.update(message) {
                if let Some(next) = self.run_effect(effect, &mut presentation) {
                    queue.push_back(next);
                }
            }
        }

        presentation
    }

    /// Execute one effect and return its follow-up message. Effects only the
    /// renderer can act on go to `presentation`.
    fn run_effect(&mut self, effect: Effect, presentation: &mut Vec<Effect>) -> Option<Message> {
        let message = match effect {
            Effect::Fetch {
                generation,
                reference,
                token,
            } => {
                let result = self
                    .source
                    .fetch(&reference, &token)
                    .map_err(|err| format!("{err:#}"));
                if let Err(err) = &result {
                    warn!(reference = %reference, generation, %err, "Fetch failed");
                }
                Message::DocumentLoaded { generation, result }
            }
            Effect::Prefetch(reference) => {
                let result = self
                    .source
                    .fetch(&reference, &CancellationToken::new())
                    .map_err(|err| format!("{err:#}"));
                Message::Prefetched { reference, result }
            }
            Effect::RequestLayout => Message::LayoutSettled { tops: None },
            Effect::SaveLink { page, draft } => Message::Saved {
                page,
                result: self
                    .mutations
                    .save_link(&draft)
                    .map_err(|err| format!("{err:#}")),
            },
            Effect::SaveNote { page, draft } => Message::Saved {
                page,
                result: self
                    .mutations
                    .save_note(&draft)
                    .map_err(|err| format!("{err:#}")),
            },
            Effect::SaveText(draft) => {
                let result = self.mutations.save_text(&draft).map_err(|err| format!("{err:#}"));
                Message::TextSaved {
                    reference: draft.reference,
                    result,
                }
            }
            Effect::DeleteLink { page, id } => {
                let result = self.mutations.delete_link(&id).map_err(|err| format!("{err:#}"));
                Message::Deleted { page, id, result }
            }
            Effect::DeleteNote { page, id } => {
                let result = self.mutations.delete_note(&id).map_err(|err| format!("{err:#}"));
                Message::Deleted { page, id, result }
            }
            effect @ (Effect::AlignPanel { .. } | Effect::Notify(_)) => {
                debug!(?effect, "Passing effect to the renderer");
                presentation.push(effect);
                return None;
            }
        };
        Some(message)
    }
}
