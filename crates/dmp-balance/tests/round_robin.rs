use dmp_balance::Balance;
use dmp_discovery::{Service, ServiceStatus};
use std::net::Ipv4Addr;

fn service(port: u16) -> Service {
    Service::new("orders".to_string(), Ipv4Addr::LOCALHOST.into(), port, ServiceStatus::Alive)
}

#[test]
fn cursor_wraps_around_after_the_last_candidate() {
    let balance = Balance::new();
    let services = vec![service(9001), service(9002), service(9003)];

    let picks: Vec<u16> = (0..5)
        .map(|_| balance.dispatch("orders", &services).unwrap().comm_port)
        .collect();

    assert_eq!(picks, vec![9001, 9002, 9003, 9001, 9002]);
}

#[test]
fn each_namespace_gets_an_independent_cursor() {
    let balance = Balance::new();
    let orders = vec![service(9001), service(9002)];
    let mut billing = vec![service(8001), service(8002), service(8003)];
    billing[0].namespace = "billing".to_string();
    billing[1].namespace = "billing".to_string();
    billing[2].namespace = "billing".to_string();

    assert_eq!(balance.dispatch("orders", &orders).unwrap().comm_port, 9001);
    assert_eq!(balance.dispatch("billing", &billing).unwrap().comm_port, 8001);
    assert_eq!(balance.dispatch("orders", &orders).unwrap().comm_port, 9002);
    assert_eq!(balance.dispatch("billing", &billing).unwrap().comm_port, 8002);
}

#[test]
fn an_empty_candidate_list_returns_none_instead_of_panicking() {
    let balance = Balance::new();
    assert!(balance.dispatch("orders", &[]).is_none());
}
