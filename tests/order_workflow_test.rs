//! Order workflow integration tests
//!
//! Exercises the transactional paths on a real (in-memory) database: stock
//! reservation at creation, conditional rejection on shortfall, and
//! exactly-once stock restoration on cancellation.

mod common;

use common::TestEnv;
use souk_server::db::models::{OrderLine, OrderStatus};
use souk_server::db::repository::RepoError;

#[tokio::test]
async fn creating_an_order_reserves_stock_and_freezes_prices() {
    let env = TestEnv::new().await;
    let buyer = env.seed_buyer("buyer@test.com", "Cairo").await;
    let seller = env.seed_seller("seller@test.com", None).await;
    let product = env.seed_product(&seller, 25.0, 10).await;

    let order = env
        .orders
        .create_pending(
            buyer.clone(),
            seller.clone(),
            vec![OrderLine {
                product: product.clone(),
                quantity: 3,
                unit_price: 25.0,
            }],
            "leave at the door".to_string(),
        )
        .await
        .expect("order creation");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, 75.0);
    assert_eq!(order.lines.len(), 1);
    assert_eq!(env.stock_of(&product).await, 7);
}

#[tokio::test]
async fn over_quantity_order_is_rejected_without_touching_stock() {
    let env = TestEnv::new().await;
    let buyer = env.seed_buyer("buyer@test.com", "Cairo").await;
    let seller = env.seed_seller("seller@test.com", None).await;
    let scarce = env.seed_product(&seller, 10.0, 2).await;
    let plenty = env.seed_product(&seller, 5.0, 100).await;

    // Second line exceeds stock, so the whole order must roll back,
    // including the first line's decrement
    let result = env
        .orders
        .create_pending(
            buyer,
            seller,
            vec![
                OrderLine {
                    product: plenty.clone(),
                    quantity: 10,
                    unit_price: 5.0,
                },
                OrderLine {
                    product: scarce.clone(),
                    quantity: 3,
                    unit_price: 10.0,
                },
            ],
            String::new(),
        )
        .await;

    assert!(matches!(result, Err(RepoError::Conflict(_))));
    assert_eq!(env.stock_of(&plenty).await, 100);
    assert_eq!(env.stock_of(&scarce).await, 2);
}

#[tokio::test]
async fn cancelling_restores_stock_exactly_once() {
    let env = TestEnv::new().await;
    let buyer = env.seed_buyer("buyer@test.com", "Cairo").await;
    let seller = env.seed_seller("seller@test.com", None).await;
    let product = env.seed_product(&seller, 25.0, 5).await;

    let order = env
        .orders
        .create_pending(
            buyer,
            seller,
            vec![OrderLine {
                product: product.clone(),
                quantity: 2,
                unit_price: 25.0,
            }],
            String::new(),
        )
        .await
        .expect("order creation");
    let order_id = order.id.expect("order id");
    assert_eq!(env.stock_of(&product).await, 3);

    let cancelled = env
        .orders
        .transition(
            &order_id,
            OrderStatus::Pending,
            OrderStatus::Cancelled,
            &order.lines,
        )
        .await
        .expect("cancel");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(env.stock_of(&product).await, 5);

    // A second cancel misses the compare-and-swap and must not restore again
    let second = env
        .orders
        .transition(
            &order_id,
            OrderStatus::Pending,
            OrderStatus::Cancelled,
            &order.lines,
        )
        .await;
    assert!(matches!(second, Err(RepoError::Conflict(_))));
    assert_eq!(env.stock_of(&product).await, 5);
}

#[tokio::test]
async fn forward_transitions_do_not_touch_stock() {
    let env = TestEnv::new().await;
    let buyer = env.seed_buyer("buyer@test.com", "Cairo").await;
    let seller = env.seed_seller("seller@test.com", None).await;
    let product = env.seed_product(&seller, 25.0, 5).await;

    let order = env
        .orders
        .create_pending(
            buyer,
            seller,
            vec![OrderLine {
                product: product.clone(),
                quantity: 1,
                unit_price: 25.0,
            }],
            String::new(),
        )
        .await
        .expect("order creation");
    let order_id = order.id.expect("order id");

    let shipping = env
        .orders
        .transition(
            &order_id,
            OrderStatus::Pending,
            OrderStatus::Shipping,
            &order.lines,
        )
        .await
        .expect("ship");
    assert_eq!(shipping.status, OrderStatus::Shipping);
    assert_eq!(env.stock_of(&product).await, 4);

    let delivered = env
        .orders
        .transition(
            &order_id,
            OrderStatus::Shipping,
            OrderStatus::Delivered,
            &order.lines,
        )
        .await
        .expect("deliver");
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert_eq!(env.stock_of(&product).await, 4);
}

#[tokio::test]
async fn racing_orders_never_oversell() {
    let env = TestEnv::new().await;
    let buyer_a = env.seed_buyer("a@test.com", "Cairo").await;
    let buyer_b = env.seed_buyer("b@test.com", "Giza").await;
    let seller = env.seed_seller("seller@test.com", None).await;
    let product = env.seed_product(&seller, 10.0, 3).await;

    let line = |qty| {
        vec![OrderLine {
            product: product.clone(),
            quantity: qty,
            unit_price: 10.0,
        }]
    };

    // Two orders of 2 against a stock of 3: at most one can win
    let (first, second) = tokio::join!(
        env.orders
            .create_pending(buyer_a, seller.clone(), line(2), String::new()),
        env.orders
            .create_pending(buyer_b, seller.clone(), line(2), String::new()),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert!(successes <= 1, "both racing orders succeeded");

    let stock = env.stock_of(&product).await;
    assert!(stock >= 0, "stock went negative: {stock}");
    assert_eq!(stock, 3 - 2 * successes as i64);
}

#[tokio::test]
async fn deleting_a_pending_order_restores_stock() {
    let env = TestEnv::new().await;
    let buyer = env.seed_buyer("buyer@test.com", "Cairo").await;
    let seller = env.seed_seller("seller@test.com", None).await;
    let product = env.seed_product(&seller, 25.0, 5).await;

    let order = env
        .orders
        .create_pending(
            buyer,
            seller,
            vec![OrderLine {
                product: product.clone(),
                quantity: 2,
                unit_price: 25.0,
            }],
            String::new(),
        )
        .await
        .expect("order creation");
    let order_id = order.id.clone().expect("order id");

    env.orders
        .delete(&order_id, &order.lines)
        .await
        .expect("delete");
    assert_eq!(env.stock_of(&product).await, 5);
    assert!(
        env.orders
            .find_by_id(&order_id)
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test]
async fn deleting_a_cancelled_order_does_not_restore_twice() {
    let env = TestEnv::new().await;
    let buyer = env.seed_buyer("buyer@test.com", "Cairo").await;
    let seller = env.seed_seller("seller@test.com", None).await;
    let product = env.seed_product(&seller, 25.0, 5).await;

    let order = env
        .orders
        .create_pending(
            buyer,
            seller,
            vec![OrderLine {
                product: product.clone(),
                quantity: 2,
                unit_price: 25.0,
            }],
            String::new(),
        )
        .await
        .expect("order creation");
    let order_id = order.id.clone().expect("order id");

    env.orders
        .transition(
            &order_id,
            OrderStatus::Pending,
            OrderStatus::Cancelled,
            &order.lines,
        )
        .await
        .expect("cancel");
    assert_eq!(env.stock_of(&product).await, 5);

    env.orders
        .delete(&order_id, &order.lines)
        .await
        .expect("delete");
    assert_eq!(env.stock_of(&product).await, 5);
}

#[tokio::test]
async fn role_scoped_listings_return_the_right_orders() {
    let env = TestEnv::new().await;
    let buyer = env.seed_buyer("buyer@test.com", "Cairo").await;
    let seller = env.seed_seller("seller@test.com", None).await;
    let other_seller = env.seed_seller("other@test.com", None).await;
    let product = env.seed_product(&seller, 10.0, 10).await;

    env.orders
        .create_pending(
            buyer.clone(),
            seller.clone(),
            vec![OrderLine {
                product,
                quantity: 1,
                unit_price: 10.0,
            }],
            String::new(),
        )
        .await
        .expect("order creation");

    assert_eq!(env.orders.find_by_buyer(&buyer).await.expect("by buyer").len(), 1);
    assert_eq!(
        env.orders.find_by_seller(&seller).await.expect("by seller").len(),
        1
    );
    assert!(
        env.orders
            .find_by_seller(&other_seller)
            .await
            .expect("by other seller")
            .is_empty()
    );
}
