use packsim_data::{CatalogProvider, PokemonTcg, ProviderError};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use tiny_http::{Response, Server, StatusCode};

/// Every request the local catalog saw, as `(url, api key header)`.
type Seen = Arc<Mutex<Vec<(String, Option<String>)>>>;

fn serve(route: impl Fn(&str) -> (u16, String) + Send + 'static) -> (String, Seen) {
    let server = Server::http("127.0.0.1:0").expect("bind");
    let addr = server.server_addr().to_ip().expect("tcp address");
    let seen: Seen = Arc::default();
    let log = Arc::clone(&seen);
    thread::spawn(move || {
        for request in server.incoming_requests() {
            let key = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("X-Api-Key"))
                .map(|header| header.value.to_string());
            log.lock().expect("lock").push((request.url().to_string(), key));
            let (status, body) = route(request.url());
            let response = Response::from_string(body).with_status_code(StatusCode(status));
            let _ = request.respond(response);
        }
    });
    (format!("http://{addr}/v2"), seen)
}

fn card_page(number: u32, total: u32) -> String {
    format!(
        r#"{{"data":[{{"id":"sv1-{number}","name":"Card {number}","number":"{number}",
        "rarity":"Common","images":{{"small":"s.png","large":"l.png"}}}}],"totalCount":{total}}}"#
    )
}

#[test]
fn search_walks_every_page() {
    let (base, seen) = serve(|url| {
        if url.contains("page=2") {
            (200, card_page(2, 300))
        } else {
            (200, card_page(1, 300))
        }
    });
    let client = PokemonTcg::new(Some("secret".to_string())).with_base_url(&base);
    let cards = client.find_cards("set.id:sv1").expect("search");
    let ids: Vec<&str> = cards.iter().map(|card| card.id.as_str()).collect();
    assert_eq!(ids, vec!["sv1-1", "sv1-2"]);

    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 2);
    assert!(seen[0].0.starts_with("/v2/cards?"));
    assert!(seen[1].0.contains("page=2"));
    assert!(seen[1].0.contains("pageSize=250"));
    assert!(seen.iter().all(|(_, key)| key.as_deref() == Some("secret")));
}

#[test]
fn missing_page_ends_search_with_what_was_collected() {
    let (base, seen) = serve(|url| {
        if url.contains("page=2") {
            (404, String::new())
        } else {
            (200, card_page(1, 600))
        }
    });
    let client = PokemonTcg::new(None).with_base_url(&base);
    let cards = client.find_cards("set.id:sv1").expect("search");
    assert_eq!(cards.len(), 1);
    let seen = seen.lock().expect("lock");
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(_, key)| key.is_none()));
}

#[test]
fn too_many_requests_is_rate_limited() {
    let (base, _) = serve(|_| (429, String::new()));
    let client = PokemonTcg::new(None).with_base_url(&base);
    let err = client.find_sets("id:sv1 OR ptcgoCode:sv1").expect_err("limited");
    assert!(matches!(err, ProviderError::RateLimited), "{err:?}");
}

#[test]
fn server_errors_carry_the_catalog_message() {
    let (base, _) = serve(|_| {
        (
            500,
            r#"{"error":{"code":500,"message":"Internal Server Error"}}"#.to_string(),
        )
    });
    let client = PokemonTcg::new(None).with_base_url(&base);
    let err = client.find_sets("id:sv1").expect_err("server error");
    assert!(
        matches!(err, ProviderError::Remote(ref message) if message == "Internal Server Error"),
        "{err:?}"
    );
}

#[test]
fn unreachable_catalog_is_a_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let client = PokemonTcg::new(None).with_base_url(&format!("http://127.0.0.1:{port}/v2"));
    let err = client.find_sets("id:sv1").expect_err("refused");
    assert!(matches!(err, ProviderError::Transport(_)), "{err:?}");
}
