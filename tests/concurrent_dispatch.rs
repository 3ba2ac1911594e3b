//! Concurrent callers sharing one dispatcher.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, Mutex};

use resource_dispatch::context::{CallerContext, PropagationContext, PropagationKey};
use resource_dispatch::dispatch::{ClientResult, Dispatcher, HttpClient, ReadRequest};

/// Echoes the propagated remote address after an optional pause.
#[derive(Default)]
struct EchoClient {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    release: Mutex<Option<oneshot::Sender<()>>>,
}

#[async_trait]
impl HttpClient for EchoClient {
    type Headers = ();
    type Message = ();
    type TargetType = ();
    type MediaType = ();
    type Output = (String, Option<String>, bool);

    async fn process_get(
        &self,
        ctx: PropagationContext,
        request: ReadRequest<(), ()>,
    ) -> ClientResult<Self::Output> {
        match request.path.as_str() {
            "/wait" => {
                let gate = self.gate.lock().await.take();
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
            }
            "/release" => {
                if let Some(release) = self.release.lock().await.take() {
                    let _ = release.send(());
                }
            }
            _ => tokio::time::sleep(Duration::from_millis(fastish_delay(&ctx))).await,
        }
        Ok((
            request.path.to_string(),
            ctx.get_as::<String>(PropagationKey::RemoteAddress).cloned(),
            ctx.is_main_strand(),
        ))
    }
}

fn fastish_delay(ctx: &PropagationContext) -> u64 {
    ctx.get_as::<String>(PropagationKey::RemoteAddress)
        .map(|addr| (addr.len() as u64 % 5) + 1)
        .unwrap_or(1)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_caller_sees_its_own_context() {
    let dispatcher = Dispatcher::new(Arc::new(EchoClient::default()));

    let mut handles = Vec::new();
    for i in 0..32 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            let mut caller = CallerContext::new()
                .with_local(PropagationKey::RemoteAddress, format!("10.0.0.{}", i));
            if i % 2 == 0 {
                caller = caller.with_parent_function("onMessage");
            }
            let path = format!("/items/{}", i);
            let seen = dispatcher.get(&caller, path.as_str(), (), ()).await.unwrap();
            (i, seen)
        }));
    }

    for handle in handles {
        let (i, (path, remote, main_strand)) = handle.await.unwrap();
        assert_eq!(path, format!("/items/{}", i));
        assert_eq!(remote, Some(format!("10.0.0.{}", i)));
        assert_eq!(main_strand, i % 2 == 0);
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_suspended_call_does_not_block_other_callers() {
    let (tx, rx) = oneshot::channel();
    let client = EchoClient {
        gate: Mutex::new(Some(rx)),
        release: Mutex::new(Some(tx)),
    };
    let dispatcher = Dispatcher::new(Arc::new(client));
    let waiting = CallerContext::new().with_name("waiting");
    let releasing = CallerContext::new().with_name("releasing");

    // On a single-threaded runtime the first call can only finish if it
    // yields while suspended and lets the second one run.
    let (first, second) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(
            dispatcher.get(&waiting, "/wait", (), ()),
            dispatcher.get(&releasing, "/release", (), ()),
        )
    })
    .await
    .expect("calls should not deadlock");

    assert_eq!(first.unwrap().0, "/wait");
    assert_eq!(second.unwrap().0, "/release");
}
