use around_common::model::{post::Location, search::Distance};
use around_db::{
    elastic::{ElasticStore, geo_distance_body},
    record::{LOCATION_FIELD, POST_DOC_TYPE, POST_INDEX, post_index_mapping},
    store::{GeoRadiusQuery, Namespace, Store, StoreError},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, query_param},
};

const NAMESPACE: Namespace<'static> = Namespace {
    index: POST_INDEX,
    doc_type: POST_DOC_TYPE,
};

fn store(server: &MockServer) -> ElasticStore {
    ElasticStore::new(&server.uri()).unwrap()
}

fn query_at(lat: f64, lon: f64, kilometers: f64) -> GeoRadiusQuery<'static> {
    GeoRadiusQuery {
        index: POST_INDEX,
        field: LOCATION_FIELD,
        center: Location::new(lat, lon).unwrap(),
        radius: Distance::kilometers(kilometers).unwrap(),
        size: 10,
    }
}

#[tokio::test]
async fn index_exists_follows_head_status() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/around"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    assert!(!store.index_exists("around").await.unwrap());
    assert!(store.index_exists("elsewhere").await.unwrap());
}

#[tokio::test]
async fn index_exists_reports_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/around"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = store(&server).index_exists("around").await;
    assert!(matches!(result, Err(StoreError::Status { status: 500, .. })));
}

#[tokio::test]
async fn create_index_sends_mapping() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/around"))
        .and(body_json(post_index_mapping()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .create_index("around", &post_index_mapping())
        .await
        .unwrap();
}

#[tokio::test]
async fn create_index_conflict_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/around"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("resource_already_exists_exception"),
        )
        .mount(&server)
        .await;

    let result = store(&server)
        .create_index("around", &post_index_mapping())
        .await;
    match result {
        Err(StoreError::Status { status, body }) => {
            assert_eq!(status, 400);
            assert_eq!(body, "resource_already_exists_exception");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn documents_are_written_with_refresh() {
    let server = MockServer::start().await;
    let document = json!({
        "user": "john",
        "message": "hello world",
        "location": { "lat": 37.0, "lon": -122.0 }
    });
    Mock::given(path("/around/_doc/x"))
        .and(query_param("refresh", "true"))
        .and(body_json(&document))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "result": "created" })))
        .expect(1)
        .mount(&server)
        .await;

    store(&server)
        .index_document(NAMESPACE, "x", &document, true)
        .await
        .unwrap();
}

#[tokio::test]
async fn refused_writes_are_status_errors() {
    let server = MockServer::start().await;
    Mock::given(path("/around/_doc/x"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let result = store(&server)
        .index_document(NAMESPACE, "x", &json!({}), true)
        .await;
    assert!(matches!(result, Err(StoreError::Status { status: 503, .. })));
}

#[tokio::test]
async fn geo_query_round_trip() {
    let server = MockServer::start().await;
    let query = query_at(37.1, -122.1, 50.0);
    Mock::given(path("/around/_search"))
        .and(body_json(geo_distance_body(&query)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 4,
            "timed_out": false,
            "hits": {
                "total": { "value": 1, "relation": "eq" },
                "hits": [{
                    "_index": "around",
                    "_id": "x",
                    "_source": {
                        "user": "john",
                        "message": "hello world",
                        "location": { "lat": 37.0, "lon": -122.0 }
                    }
                }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let hits = store(&server).geo_radius_query(query).await.unwrap();

    assert_eq!(hits.total, 1);
    assert_eq!(hits.took, time::Duration::milliseconds(4));
    assert_eq!(hits.hits.len(), 1);
    assert_eq!(hits.hits[0].id, "x");
    assert_eq!(hits.hits[0].source["user"], "john");
}

#[tokio::test]
async fn failed_search_is_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(path("/around/_search"))
        .respond_with(ResponseTemplate::new(400).set_body_string("parsing_exception"))
        .mount(&server)
        .await;

    let result = store(&server)
        .geo_radius_query(query_at(0.0, 0.0, 1.0))
        .await;
    assert!(matches!(result, Err(StoreError::Status { status: 400, .. })));
}

#[tokio::test]
async fn unreachable_node_is_a_transport_error() {
    let address = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let store = ElasticStore::new(&format!("http://{address}")).unwrap();
    let result = store.index_exists("around").await;
    assert!(matches!(result, Err(StoreError::Transport(_))));
}
