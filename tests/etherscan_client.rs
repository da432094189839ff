use abi_sql_api::config::EtherscanConfig;
use abi_sql_api::etherscan::{AbiSource, EtherscanClient, EtherscanError};
use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

const ADDRESS: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
const ADDRESS_LOWER: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

fn client_for(server: &MockServer) -> EtherscanClient {
    EtherscanClient::new(&EtherscanConfig {
        base_url: format!("{}/api", server.uri()),
        api_key: "test-key".to_string(),
        timeout_secs: 2,
        connect_timeout_secs: 1,
    })
    .unwrap()
}

fn transfer_abi() -> String {
    json!([
        {
            "anonymous": false,
            "inputs": [
                {"indexed": true, "name": "from", "type": "address"},
                {"indexed": true, "name": "to", "type": "address"},
                {"indexed": false, "name": "value", "type": "uint256"}
            ],
            "name": "Transfer",
            "type": "event"
        },
        {"stateMutability": "payable", "type": "fallback"}
    ])
    .to_string()
}

#[tokio::test]
async fn get_abi_lowercases_address_and_decodes_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("module", "contract"))
        .and(query_param("action", "getabi"))
        .and(query_param("address", ADDRESS_LOWER))
        .and(query_param("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": transfer_abi(),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let abi = client_for(&server).get_abi(ADDRESS).await.unwrap();

    assert_eq!(abi.len(), 2);
    assert_eq!(abi[0].name.as_deref(), Some("Transfer"));
    assert_eq!(abi[0].inputs.len(), 3);
    assert_eq!(abi[1].item_type, "fallback");
}

#[tokio::test]
async fn get_abi_surfaces_explorer_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("action", "getabi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Contract source code not verified",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_abi(ADDRESS).await.unwrap_err();
    match err {
        EtherscanError::ApiError { message, result } => {
            assert_eq!(message, "NOTOK");
            assert_eq!(result, "Contract source code not verified");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn get_abi_rejects_invalid_abi_documents() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("action", "getabi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": "[{\"type\": \"event\", \"name\": \"Broken\", \"inputs\": [{\"name\": \"x\"}]}]",
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_abi(ADDRESS).await.unwrap_err();
    assert!(matches!(err, EtherscanError::InvalidAbi(_)));
}

#[tokio::test]
async fn get_abi_rejects_non_json_bodies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_abi(ADDRESS).await.unwrap_err();
    assert!(matches!(err, EtherscanError::MalformedResponse(_)));
}

#[tokio::test]
async fn http_errors_are_not_swallowed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).get_abi(ADDRESS).await.unwrap_err();
    assert!(matches!(err, EtherscanError::HttpStatus(status) if status.as_u16() == 503));
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "1", "message": "OK", "result": "[]"}))
                .set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).get_abi(ADDRESS).await.unwrap_err();
    assert!(matches!(err, EtherscanError::TimeoutError));
}

#[tokio::test]
async fn get_contract_returns_first_named_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("action", "getsourcecode"))
        .and(query_param("address", ADDRESS_LOWER))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [{
                "SourceCode": "pragma solidity 0.6.12;",
                "ABI": "[]",
                "ContractName": "FiatTokenProxy",
                "CompilerVersion": "v0.6.12+commit.27d51765",
                "OptimizationUsed": "1"
            }],
        })))
        .mount(&server)
        .await;

    let contract = client_for(&server).get_contract(ADDRESS).await.unwrap();

    assert_eq!(contract.contract_name, "FiatTokenProxy");
    assert_eq!(contract.fields["CompilerVersion"], "v0.6.12+commit.27d51765");

    let value = serde_json::to_value(&contract).unwrap();
    assert_eq!(value["ContractName"], "FiatTokenProxy");
    assert_eq!(value["SourceCode"], "pragma solidity 0.6.12;");
}

#[tokio::test]
async fn get_contract_requires_a_contract_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("action", "getsourcecode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "1",
            "message": "OK",
            "result": [{"SourceCode": "", "ABI": "Contract source code not verified", "ContractName": ""}],
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_contract(ADDRESS).await.unwrap_err();
    assert!(matches!(err, EtherscanError::ContractNotFound(address) if address == ADDRESS_LOWER));
}
