use crate::snapshot::PageSnapshot;
use anyhow::Result;
use async_trait::async_trait;
use kassa_actors::actor::{Actor, Addr, Context};
use kassa_dom::{key_code_for, Dispatch, Document, EventKind, NodeId, PageEvent};
use kassa_forms::binder::{BoundField, SuggestBinder, SuggestQuery};
use kassa_forms::mask::PhoneMask;
use kassa_forms::modal::{self, ClickOutcome, ModalToggler, MODAL_CLOSE_DELAY};
use kassa_suggest::{AddressSuggestions, Suggestion};
use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

pub enum PageMsg {
    /// Document-wide click on the element behind the selector.
    Click { target: String },
    Focus { target: String },
    Blur { target: String },
    /// User typing: per character, keydown then (unless suppressed) the
    /// default insertion and an input event.
    Type { target: String, text: String },
    /// Programmatic value change (paste etc.) followed by an input event.
    Input { target: String, value: String },
    /// Pick the nth held suggestion for the field.
    Pick { target: String, index: usize },
    SuggestionsReady {
        field: BoundField,
        seq: u64,
        items: Vec<Suggestion>,
    },
    /// Deferred modal close firing.
    CloseModals,
    Snapshot { reply: oneshot::Sender<PageSnapshot> },
    Shutdown,
}

/// Owns the document and every attached behavior. All mutation happens in
/// `handle`, so the mailbox is the page's event loop.
pub struct PageActor {
    doc: Document,
    masks: Vec<PhoneMask>,
    modal: ModalToggler,
    binder: Option<SuggestBinder>,
    provider: Option<Arc<dyn AddressSuggestions>>,
    session: Uuid,
}

impl PageActor {
    pub fn new(
        doc: Document,
        binder: Option<SuggestBinder>,
        provider: Option<Arc<dyn AddressSuggestions>>,
    ) -> Self {
        let masks = PhoneMask::attach_all(&doc);
        let session = Uuid::new_v4();
        tracing::info!(
            %session,
            masked_fields = masks.len(),
            autocomplete = binder.is_some(),
            "page ready"
        );
        Self {
            doc,
            masks,
            modal: ModalToggler::personal_data(),
            binder,
            provider,
            session,
        }
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    fn resolve(&self, selector: &str) -> Option<NodeId> {
        match self.doc.query(selector) {
            Ok(node) => Some(node),
            Err(e) => {
                tracing::warn!(error = %e, "event target not found");
                None
            }
        }
    }

    /// Route one event through every behavior. Returns whether a handler
    /// suppressed the default action.
    fn dispatch(&mut self, target: NodeId, kind: EventKind, me: Addr<PageActor>) -> bool {
        let event = PageEvent::new(target, kind);
        let mut dispatch = Dispatch::new();

        for mask in &mut self.masks {
            mask.on_event(&event, &mut self.doc, &mut dispatch);
        }

        if let Some(binder) = &mut self.binder {
            if let Some(query) = binder.on_event(&event, &self.doc) {
                Self::spawn_fetch(self.provider.clone(), query, me.clone());
            }
            if let EventKind::SuggestionPicked(index) = kind {
                binder.on_pick(target, index, &mut self.doc);
            }
        }

        if kind == EventKind::Click {
            match self.modal.on_click(target, &mut self.doc) {
                Ok(ClickOutcome::CloseRequested) => Self::schedule_close(me),
                Ok(_) => {}
                // A broken modal contract is logged, not fatal; the rest of
                // the page keeps handling events.
                Err(e) => tracing::warn!(error = %e, "modal handling failed"),
            }
        }

        dispatch.default_prevented()
    }

    fn spawn_fetch(
        provider: Option<Arc<dyn AddressSuggestions>>,
        query: SuggestQuery,
        me: Addr<PageActor>,
    ) {
        let Some(provider) = provider else {
            return;
        };
        tokio::spawn(async move {
            match provider.suggest(&query.query, &query.opts).await {
                Ok(items) => {
                    let _ = me
                        .send(PageMsg::SuggestionsReady {
                            field: query.field,
                            seq: query.seq,
                            items,
                        })
                        .await;
                }
                // No retry here; a failed fetch just means no dropdown
                // for this keystroke.
                Err(e) => tracing::warn!(error = %e, "suggestion fetch failed"),
            }
        });
    }

    fn schedule_close(me: Addr<PageActor>) {
        tokio::spawn(async move {
            tokio::time::sleep(MODAL_CLOSE_DELAY).await;
            let _ = me.send(PageMsg::CloseModals).await;
        });
    }
}

#[async_trait]
impl Actor for PageActor {
    type Msg = PageMsg;

    async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()> {
        match msg {
            PageMsg::Click { target } => {
                if let Some(node) = self.resolve(&target) {
                    self.dispatch(node, EventKind::Click, ctx.addr());
                }
            }
            PageMsg::Focus { target } => {
                if let Some(node) = self.resolve(&target) {
                    self.dispatch(node, EventKind::Focus, ctx.addr());
                }
            }
            PageMsg::Blur { target } => {
                if let Some(node) = self.resolve(&target) {
                    self.dispatch(node, EventKind::Blur, ctx.addr());
                }
            }
            PageMsg::Type { target, text } => {
                if let Some(node) = self.resolve(&target) {
                    for ch in text.chars() {
                        let prevented =
                            self.dispatch(node, EventKind::KeyDown(key_code_for(ch)), ctx.addr());
                        if !prevented {
                            self.doc.insert_at_caret(node, ch);
                            self.dispatch(node, EventKind::Input, ctx.addr());
                        }
                    }
                }
            }
            PageMsg::Input { target, value } => {
                if let Some(node) = self.resolve(&target) {
                    self.doc.set_value(node, &value);
                    self.dispatch(node, EventKind::Input, ctx.addr());
                }
            }
            PageMsg::Pick { target, index } => {
                if let Some(node) = self.resolve(&target) {
                    self.dispatch(node, EventKind::SuggestionPicked(index), ctx.addr());
                }
            }
            PageMsg::SuggestionsReady { field, seq, items } => {
                if let Some(binder) = &mut self.binder {
                    binder.on_results(field, seq, items);
                }
            }
            PageMsg::CloseModals => {
                if let Err(e) = modal::close_visible_modals(&mut self.doc) {
                    tracing::warn!(error = %e, "deferred close failed");
                }
            }
            PageMsg::Snapshot { reply } => {
                let _ = reply.send(PageSnapshot::capture(&self.doc));
            }
            PageMsg::Shutdown => ctx.stop(),
        }
        Ok(())
    }
}
