use std::{collections::HashMap, sync::Arc};

use tracing::{error, info, warn};

use crate::{
    command::CommandInstance,
    context::InvocationContext,
    event::{EventInstance, GatewayEvent},
    gateway::Responder,
    interaction::{Interaction, InteractionKind, UserId},
};

/// One inbound notification from the gateway: the interaction payload
/// plus the reply channel scoped to it.
pub struct InboundNotification {
    pub interaction: Interaction,
    pub responder: Arc<dyn Responder>,
}

/// Single ingress point for inbound interactions: resolves the target
/// command by name, evaluates its guards, runs it, and contains every
/// failure. Nothing past this boundary can take the process down; only
/// registration defects (caught before the dispatcher exists) are
/// fatal.
pub struct Dispatcher {
    commands: HashMap<String, Arc<CommandInstance>>,
    events: Vec<Arc<EventInstance>>,
    owner: Option<UserId>,
}

impl Dispatcher {
    pub(crate) fn new(
        commands: Vec<Arc<CommandInstance>>,
        events: Vec<Arc<EventInstance>>,
        owner: Option<UserId>,
    ) -> Self {
        let commands = commands
            .into_iter()
            .map(|instance| (instance.name().to_string(), instance))
            .collect();

        Self {
            commands,
            events,
            owner,
        }
    }

    pub fn command(&self, name: &str) -> Option<&Arc<CommandInstance>> {
        self.commands.get(name)
    }

    /// Routes one interaction. Non-command interaction kinds are
    /// ignored here; component and modal handling belongs to the
    /// embedding application.
    pub async fn dispatch(&self, interaction: Interaction, responder: Arc<dyn Responder>) {
        if interaction.kind != InteractionKind::Command {
            return;
        }

        let Some(instance) = self.commands.get(&interaction.command).cloned() else {
            // One private reply; a failed delivery is dropped.
            if let Err(err) = responder.create("Unknown command.", true).await {
                warn!(command = %interaction.command, %err, "failed to deliver unknown-command reply");
            }
            return;
        };

        let ctx = InvocationContext::new(interaction, responder, self.owner);

        if !instance.can_execute(&ctx).await {
            // The denial reply was already sent during guard evaluation.
            return;
        }

        match instance.execute(&ctx).await {
            Ok(()) => {
                info!(command = %instance.name(), user = %ctx.user(), "command completed");
            }
            Err(err) => {
                error!(command = %instance.name(), user = %ctx.user(), %err, "command failed");
                if let Err(err) = ctx
                    .create_or_edit("There was an error while running this command.", true)
                    .await
                {
                    warn!(command = %instance.name(), %err, "failed to deliver failure notice");
                }
            }
        }
    }

    /// Fans a gateway event out to every listener registered for its
    /// kind. Listener failures are logged and contained.
    pub async fn dispatch_event(&self, event: &GatewayEvent) {
        for instance in &self.events {
            if let Err(err) = instance.handle(event).await {
                error!(event = ?event.kind(), %err, "event handler failed");
            }
        }
    }

    /// Intake loop: notifications are picked up in arrival order and
    /// each runs on its own task, so a slow handler never holds up the
    /// queue. Returns when the sending side is dropped.
    pub async fn run(self: Arc<Self>, rx: flume::Receiver<InboundNotification>) {
        while let Ok(notification) = rx.recv_async().await {
            let dispatcher = Arc::clone(&self);
            tokio::spawn(async move {
                dispatcher
                    .dispatch(notification.interaction, notification.responder)
                    .await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        command::Command,
        metadata::{GuardOptions, MetadataStore},
        module::ModuleRegistry,
        test_support::{RecordingResponder, command_interaction},
    };

    const OWNER: UserId = UserId(7);
    const USER: UserId = UserId(10);
    const OTHER: UserId = UserId(11);

    struct Ping {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Command for Ping {
        async fn execute(&self, ctx: &InvocationContext) -> anyhow::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            ctx.reply("Pong!").await
        }
    }

    struct Shutdown {
        runs: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Command for Shutdown {
        async fn execute(&self, _ctx: &InvocationContext) -> anyhow::Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Fails without ever replying.
    struct Broken;

    #[async_trait]
    impl Command for Broken {
        async fn execute(&self, _ctx: &InvocationContext) -> anyhow::Result<()> {
            anyhow::bail!("database is on fire")
        }
    }

    /// Replies first, then fails.
    struct BrokenAfterReply;

    #[async_trait]
    impl Command for BrokenAfterReply {
        async fn execute(&self, ctx: &InvocationContext) -> anyhow::Result<()> {
            ctx.reply("working on it...").await?;
            anyhow::bail!("database is on fire")
        }
    }

    fn dispatcher_with<T: Command + 'static>(
        store: &MetadataStore,
        handler: T,
        owner: Option<UserId>,
    ) -> Dispatcher {
        let mut registry = ModuleRegistry::new();
        registry
            .register_command(CommandInstance::bind(handler, store).unwrap())
            .unwrap();
        registry.into_dispatcher(owner)
    }

    #[tokio::test]
    async fn non_command_interactions_are_ignored() {
        let mut store = MetadataStore::new();
        store.attach_command::<Ping>("ping", "Replies with pong").unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(&store, Ping { runs: runs.clone() }, None);

        let responder = RecordingResponder::new();
        let mut interaction = command_interaction("ping", USER, None);
        interaction.kind = InteractionKind::Component;
        dispatcher.dispatch(interaction, responder.clone()).await;

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(responder.creates().is_empty());
    }

    #[tokio::test]
    async fn unknown_command_gets_one_private_reply() {
        let mut store = MetadataStore::new();
        store.attach_command::<Ping>("ping", "Replies with pong").unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(&store, Ping { runs: runs.clone() }, None);

        let responder = RecordingResponder::new();
        dispatcher
            .dispatch(command_interaction("frobnicate", USER, None), responder.clone())
            .await;

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(
            responder.creates(),
            vec![("Unknown command.".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn unknown_command_delivery_failure_is_swallowed() {
        let dispatcher = ModuleRegistry::new().into_dispatcher(None);

        let responder = RecordingResponder::failing();
        dispatcher
            .dispatch(command_interaction("frobnicate", USER, None), responder.clone())
            .await;

        assert!(responder.creates().is_empty());
    }

    #[tokio::test]
    async fn handler_error_turns_into_one_generic_notice() {
        let mut store = MetadataStore::new();
        store.attach_command::<Broken>("explode", "Always fails").unwrap();
        let dispatcher = dispatcher_with(&store, Broken, None);

        let responder = RecordingResponder::new();
        dispatcher
            .dispatch(command_interaction("explode", USER, None), responder.clone())
            .await;

        // No handler reply was pending, so the notice is a fresh
        // private reply, and the error text stays generic.
        assert_eq!(
            responder.creates(),
            vec![(
                "There was an error while running this command.".to_string(),
                true
            )]
        );
        assert!(responder.edits().is_empty());
    }

    #[tokio::test]
    async fn handler_error_after_reply_edits_the_pending_reply() {
        let mut store = MetadataStore::new();
        store
            .attach_command::<BrokenAfterReply>("explode", "Fails after replying")
            .unwrap();
        let dispatcher = dispatcher_with(&store, BrokenAfterReply, None);

        let responder = RecordingResponder::new();
        dispatcher
            .dispatch(command_interaction("explode", USER, None), responder.clone())
            .await;

        assert_eq!(
            responder.creates(),
            vec![("working on it...".to_string(), false)]
        );
        assert_eq!(
            responder.edits(),
            vec!["There was an error while running this command.".to_string()]
        );
    }

    #[tokio::test]
    async fn failure_notice_delivery_failure_is_swallowed() {
        let mut store = MetadataStore::new();
        store.attach_command::<Broken>("explode", "Always fails").unwrap();
        let dispatcher = dispatcher_with(&store, Broken, None);

        let responder = RecordingResponder::failing();
        dispatcher
            .dispatch(command_interaction("explode", USER, None), responder.clone())
            .await;

        assert!(responder.creates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn ping_cooldown_end_to_end() {
        let mut store = MetadataStore::new();
        store.attach_command::<Ping>("ping", "Replies with pong").unwrap();
        store.attach_cooldown::<Ping>(Duration::from_millis(3000));
        let runs = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(&store, Ping { runs: runs.clone() }, None);

        // First invocation by U runs and arms U's cooldown.
        let responder = RecordingResponder::new();
        dispatcher
            .dispatch(command_interaction("ping", USER, None), responder.clone())
            .await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(responder.creates(), vec![("Pong!".to_string(), false)]);

        // Immediate second invocation by U is denied with the rounded
        // remaining time.
        let responder = RecordingResponder::new();
        dispatcher
            .dispatch(command_interaction("ping", USER, None), responder.clone())
            .await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(
            responder.creates(),
            vec![("Please wait 3s before using /ping again.".to_string(), true)]
        );

        // A different user is unaffected.
        let responder = RecordingResponder::new();
        dispatcher
            .dispatch(command_interaction("ping", OTHER, None), responder.clone())
            .await;
        assert_eq!(runs.load(Ordering::SeqCst), 2);

        // U is allowed again once the window has elapsed.
        tokio::time::advance(Duration::from_millis(3001)).await;
        let responder = RecordingResponder::new();
        dispatcher
            .dispatch(command_interaction("ping", USER, None), responder.clone())
            .await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn shutdown_is_owner_only_end_to_end() {
        let mut store = MetadataStore::new();
        store
            .attach_command::<Shutdown>("shutdown", "Stops the bot")
            .unwrap();
        store.attach_guard::<Shutdown>(GuardOptions {
            owner_only: true,
            ..Default::default()
        });
        let runs = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(&store, Shutdown { runs: runs.clone() }, Some(OWNER));

        let responder = RecordingResponder::new();
        dispatcher
            .dispatch(command_interaction("shutdown", USER, None), responder.clone())
            .await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(
            responder.creates(),
            vec![("Only the bot owner can use this command.".to_string(), true)]
        );

        let responder = RecordingResponder::new();
        dispatcher
            .dispatch(command_interaction("shutdown", OWNER, None), responder.clone())
            .await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(responder.creates().is_empty());
    }

    #[tokio::test]
    async fn event_handler_errors_are_contained() {
        struct Failing;

        #[async_trait]
        impl crate::event::Event for Failing {
            async fn execute(&self, _event: &GatewayEvent) -> anyhow::Result<()> {
                anyhow::bail!("listener failed")
            }
        }

        let mut store = MetadataStore::new();
        store.attach_event::<Failing>(crate::metadata::EventKind::Ready, false);

        let mut registry = ModuleRegistry::new();
        registry.register_event(crate::event::EventInstance::bind(Failing, &store).unwrap());
        let dispatcher = registry.into_dispatcher(None);

        // Must not panic or propagate.
        dispatcher
            .dispatch_event(&GatewayEvent::Ready {
                user_name: "bot".to_string(),
            })
            .await;
    }

    #[tokio::test]
    async fn run_loop_drains_notifications_in_arrival_order() {
        let mut store = MetadataStore::new();
        store.attach_command::<Ping>("ping", "Replies with pong").unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let dispatcher = Arc::new(dispatcher_with(&store, Ping { runs: runs.clone() }, None));

        let (tx, rx) = flume::unbounded();
        let loop_handle = tokio::spawn(Arc::clone(&dispatcher).run(rx));

        let responder = RecordingResponder::new();
        for _ in 0..3 {
            tx.send(InboundNotification {
                interaction: command_interaction("ping", USER, None),
                responder: responder.clone(),
            })
            .unwrap();
        }
        drop(tx);
        loop_handle.await.unwrap();
        // Let the per-notification tasks finish.
        tokio::task::yield_now().await;

        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert_eq!(responder.creates().len(), 3);
    }
}
