#[cfg(test)]
mod tests {
    use mountescrow_fees::backend::{BackendError, EscrowClient};
    use mountescrow_fees::config::BackendConfig;
    use mountescrow_fees::records::DisplayTotal;
    use rust_decimal_macros::dec;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// Serves canned responses keyed by request path and reports every raw
    /// request head it receives.
    async fn spawn_backend(
        routes: Vec<(&'static str, u16, &'static str)>,
    ) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let routes = routes.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                    }
                    let head = String::from_utf8_lossy(&buf).to_string();
                    let path = head
                        .lines()
                        .next()
                        .and_then(|line| line.split_whitespace().nth(1))
                        .unwrap_or("")
                        .to_string();
                    let _ = tx.send(head);

                    let (status, body) = routes
                        .iter()
                        .find(|(p, _, _)| *p == path)
                        .map(|(_, s, b)| (*s, *b))
                        .unwrap_or((404, r#"{"message":"not found"}"#));
                    let response = format!(
                        "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{addr}/api"), rx)
    }

    fn client(base_url: String) -> EscrowClient {
        EscrowClient::new(BackendConfig {
            base_url,
            session_cookie: Some("token=abc; csrf=xyz".into()),
            csrf_token: Some("xyz".into()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_deal_forwards_session() {
        let (base, mut requests) = spawn_backend(vec![(
            "/api/deals/d1",
            200,
            r#"{"deal":{"id":"d1","totalAmount":1000,"escrowFee":"50"}}"#,
        )])
        .await;

        let deal = client(base).deal("d1").await.unwrap();
        assert_eq!(deal.id, "d1");
        assert_eq!(deal.display_total(), Some(dec!(1050)));

        let head = requests.recv().await.unwrap().to_ascii_lowercase();
        assert!(head.starts_with("get /api/deals/d1 "));
        assert!(head.contains("cookie: token=abc; csrf=xyz"));
        assert!(head.contains("x-csrf-token: xyz"));
    }

    #[tokio::test]
    async fn test_fetch_several_deals() {
        let (base, _requests) = spawn_backend(vec![
            ("/api/deals/a", 200, r#"{"deal":{"id":"a","totalAmount":10}}"#),
            ("/api/deals/b", 200, r#"{"deal":{"id":"b","totalAmount":20}}"#),
        ])
        .await;

        let deals = client(base)
            .fetch_deals(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        let ids: Vec<_> = deals.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_fetch_proposal_and_transactions() {
        let (base, _requests) = spawn_backend(vec![
            (
                "/api/proposals/p1",
                200,
                r#"{"proposal":{"id":"p1","projectTitle":"Website","totalAmount":"2000"}}"#,
            ),
            (
                "/api/transactions",
                200,
                r#"{"transactions":[{"id":"t1","type":"deposit","amount":500}]}"#,
            ),
        ])
        .await;

        let client = client(base);
        let proposal = client.proposal("p1").await.unwrap();
        assert_eq!(proposal.project_title.as_deref(), Some("Website"));
        assert_eq!(proposal.display_total(), Some(dec!(2000)));

        let txs = client.transactions().await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].amount, Some(dec!(500)));
    }

    #[tokio::test]
    async fn test_list_deals_and_proposals() {
        let (base, mut requests) = spawn_backend(vec![
            (
                "/api/deals",
                200,
                r#"{"deals":[{"id":"a","totalAmount":1000,"escrowFee":100},{"id":42,"status":3}]}"#,
            ),
            (
                "/api/proposals",
                200,
                r#"{"proposals":[{"id":"p1","totalAmount":"2000","escrowFee":"200"}]}"#,
            ),
        ])
        .await;

        let client = client(base);
        let deals = client.deals().await.unwrap();
        assert_eq!(deals.len(), 2);
        assert_eq!(deals[0].display_total(), Some(dec!(1100)));
        assert_eq!(deals[1].id, "42");
        assert_eq!(deals[1].status.as_deref(), Some("3"));

        let proposals = client.proposals().await.unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].display_total(), Some(dec!(2200)));

        let first = requests.recv().await.unwrap().to_ascii_lowercase();
        assert!(first.starts_with("get /api/deals "));
        assert!(first.contains("x-csrf-token: xyz"));
        let second = requests.recv().await.unwrap().to_ascii_lowercase();
        assert!(second.starts_with("get /api/proposals "));
    }

    #[tokio::test]
    async fn test_list_without_key_is_empty() {
        let (base, _requests) = spawn_backend(vec![("/api/proposals", 200, r#"{}"#)]).await;

        assert!(client(base).proposals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_deals_rejects_bad_id_before_any_request() {
        let (base, mut requests) = spawn_backend(vec![(
            "/api/deals/a",
            200,
            r#"{"deal":{"id":"a"}}"#,
        )])
        .await;

        let err = client(base)
            .fetch_deals(&["a".to_string(), "a/b".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidId(_)));
        assert!(requests.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let (base, _requests) = spawn_backend(vec![(
            "/api/deals/gone",
            403,
            r#"{"message":"Invalid CSRF token"}"#,
        )])
        .await;

        let err = client(base).deal("gone").await.unwrap_err();
        match err {
            BackendError::Status { status, body, .. } => {
                assert_eq!(status, 403);
                assert!(body.contains("Invalid CSRF token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_envelope() {
        let (base, _requests) =
            spawn_backend(vec![("/api/deals/d1", 200, r#"{"data":{"id":"d1"}}"#)]).await;

        let err = client(base).deal("d1").await.unwrap_err();
        assert!(matches!(err, BackendError::Envelope { .. }));
    }

    #[tokio::test]
    async fn test_invalid_id_rejected_before_request() {
        let (base, mut requests) = spawn_backend(vec![]).await;

        let err = client(base).deal("../admin").await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidId(_)));
        assert!(requests.try_recv().is_err());
    }
}
