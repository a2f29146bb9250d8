use serde_json::json;

use crate::common::{TestApp, order_body, routes, test_address};

mod placement {
    use super::*;

    #[tokio::test]
    async fn order_freezes_prices_and_computes_totals() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let tee = app.create_item(&admin, "TS-1", "19.90", 10).await;
        let hoodie = app.create_item(&admin, "HD-1", "49.90", 10).await;

        let res = app
            .post_without_token(routes::ORDERS, &order_body(&[(tee, 3), (hoodie, 1)]))
            .await;

        assert_eq!(res.status, 201, "placement failed: {}", res.text);
        assert_eq!(res.body["status"], "placed");
        assert_eq!(res.body["paymentMethod"], "Cash on delivery");

        let lines = res.body["items"].as_array().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["item"]["price"], "19.90");
        assert_eq!(lines[0]["pieces"], 3);
        assert_eq!(lines[0]["subtotal"], "59.70");
        assert_eq!(lines[1]["subtotal"], "49.90");
        assert_eq!(res.body["total"], "109.60");

        let code = res.body["trackingCode"].as_str().unwrap();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(code, code.to_uppercase());
    }

    #[tokio::test]
    async fn placement_decrements_stock() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 10).await;

        let res = app.place_order(item, 4).await;
        assert_eq!(res.status, 201, "placement failed: {}", res.text);

        assert_eq!(app.item_stock(item).await, 6);
    }

    #[tokio::test]
    async fn later_catalog_edits_do_not_touch_the_snapshot() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 10).await;

        let placed = app.place_order(item, 1).await;
        assert_eq!(placed.status, 201);
        let order_id = placed.id();

        let res = app
            .put_with_token(&routes::item(item), &json!({"price": "99.90"}), &admin)
            .await;
        assert_eq!(res.status, 200);

        let res = app.get_with_token(&routes::order(order_id), &admin).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["items"][0]["item"]["price"], "19.90");
        assert_eq!(res.body["total"], "19.90");
    }

    #[tokio::test]
    async fn over_stock_order_fails_and_mutates_nothing() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 2).await;

        let res = app.place_order(item, 3).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Not enough stock for item Item TS-1");
        assert_eq!(app.item_stock(item).await, 2);
    }

    #[tokio::test]
    async fn failing_line_rolls_back_earlier_decrements() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let plenty = app.create_item(&admin, "TS-1", "19.90", 10).await;
        let scarce = app.create_item(&admin, "HD-1", "49.90", 1).await;

        let res = app
            .post_without_token(routes::ORDERS, &order_body(&[(plenty, 5), (scarce, 2)]))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.item_stock(plenty).await, 10);
        assert_eq!(app.item_stock(scarce).await, 1);
    }

    #[tokio::test]
    async fn missing_contact_or_address_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;

        let mut body = order_body(&[(item, 1)]);
        body.as_object_mut().unwrap().remove("contactNumber");
        let res = app.post_without_token(routes::ORDERS, &body).await;
        assert_eq!(res.status, 400);

        let mut body = order_body(&[(item, 1)]);
        body.as_object_mut().unwrap().remove("shippingAddress");
        let res = app.post_without_token(routes::ORDERS, &body).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Missing required fields");

        assert_eq!(app.item_stock(item).await, 5);
    }

    #[tokio::test]
    async fn incomplete_address_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;

        let mut address = test_address();
        address.as_object_mut().unwrap().remove("zipCode");
        let body = json!({
            "items": [{"itemId": item, "pieces": 1}],
            "contactNumber": "+35812345678",
            "billingAddress": address,
            "shippingAddress": test_address(),
        });

        let res = app.post_without_token(routes::ORDERS, &body).await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn empty_and_nonpositive_lines_are_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;

        let res = app
            .post_without_token(routes::ORDERS, &order_body(&[]))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Order must contain at least one item");

        let res = app
            .post_without_token(routes::ORDERS, &order_body(&[(item, 0)]))
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn unknown_item_is_a_404() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::ORDERS, &order_body(&[(424_242, 1)]))
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn concurrent_orders_cannot_jointly_overdraw_stock() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "A1", "10.00", 2).await;

        let (first, second) = tokio::join!(app.place_order(item, 2), app.place_order(item, 1));

        // 2 + 1 pieces against a stock of 2: at most one can commit.
        let successes: Vec<(u16, i64)> = [(first.status, 2i64), (second.status, 1i64)]
            .into_iter()
            .filter(|(status, _)| *status == 201)
            .collect();
        assert_eq!(successes.len(), 1, "exactly one order must win the stock");

        let sold = successes[0].1;
        assert_eq!(app.item_stock(item).await, 2 - sold);
    }
}

mod tracking {
    use super::*;

    #[tokio::test]
    async fn placed_order_is_publicly_trackable() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;

        let placed = app.place_order(item, 1).await;
        assert_eq!(placed.status, 201);
        let code = placed.body["trackingCode"].as_str().unwrap();

        let res = app.get_without_token(&routes::order_track(code)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["trackingCode"], *code);
        assert_eq!(res.body["status"], "placed");
    }

    #[tokio::test]
    async fn unknown_tracking_code_is_a_404() {
        let app = TestApp::spawn().await;

        let res = app
            .get_without_token(&routes::order_track("DEADBEEF"))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Order not found");
    }
}

mod history {
    use super::*;

    #[tokio::test]
    async fn account_sees_only_its_own_orders() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 20).await;

        let alice_token = app.create_authenticated_user("alice", "securepass").await;
        let alice = app.get_with_token(routes::ME, &alice_token).await;
        let alice_id = alice.id();

        let mut body = order_body(&[(item, 1)]);
        body.as_object_mut()
            .unwrap()
            .insert("userId".into(), json!(alice_id));
        let res = app.post_without_token(routes::ORDERS, &body).await;
        assert_eq!(res.status, 201);

        // A guest order that must not show up in Alice's history.
        let res = app.place_order(item, 1).await;
        assert_eq!(res.status, 201);

        let res = app.get_with_token(routes::OWN_ORDERS, &alice_token).await;

        assert_eq!(res.status, 200);
        let items = res.body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["userId"], alice_id);
    }

    #[tokio::test]
    async fn history_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::OWN_ORDERS).await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn unknown_user_id_on_checkout_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;

        let mut body = order_body(&[(item, 1)]);
        body.as_object_mut()
            .unwrap()
            .insert("userId".into(), json!(999_999));

        let res = app.post_without_token(routes::ORDERS, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(app.item_stock(item).await, 5);
    }
}

mod administration {
    use super::*;

    #[tokio::test]
    async fn order_admin_routes_enforce_the_admin_gate() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let regular = app.create_authenticated_user("bob", "securepass").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;
        let placed = app.place_order(item, 1).await;
        let order_id = placed.id();

        let res = app.get_without_token(&routes::order(order_id)).await;
        assert_eq!(res.status, 401);

        let res = app.get_with_token(&routes::order(order_id), &regular).await;
        assert_eq!(res.status, 403);

        let res = app
            .patch_without_token(&routes::order_status(order_id), &json!({"status": "processing"}))
            .await;
        assert_eq!(res.status, 401);

        let res = app
            .patch_with_token(
                &routes::order_status(order_id),
                &json!({"status": "processing"}),
                &regular,
            )
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn admin_listing_filters_by_status_and_paginates() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 20).await;

        for _ in 0..3 {
            let res = app.place_order(item, 1).await;
            assert_eq!(res.status, 201);
        }
        let placed = app.place_order(item, 1).await;
        let res = app
            .patch_with_token(
                &routes::order_status(placed.id()),
                &json!({"status": "delivered"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200);

        let res = app
            .get_with_token(&format!("{}?status=placed&limit=2", routes::ORDERS), &admin)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["pages"], 2);
        let items = res.body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|o| o["status"] == "placed"));
    }

    #[tokio::test]
    async fn invalid_status_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;
        let placed = app.place_order(item, 1).await;

        let res = app
            .patch_with_token(
                &routes::order_status(placed.id()),
                &json!({"status": "shipped"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(
            res.body["message"],
            "Invalid status. Must be one of: placed, processing, delivered, canceled"
        );
    }

    #[tokio::test]
    async fn plain_transitions_have_no_stock_side_effects() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;
        let placed = app.place_order(item, 2).await;
        let order_id = placed.id();
        assert_eq!(app.item_stock(item).await, 3);

        for status in ["processing", "delivered", "placed"] {
            let res = app
                .patch_with_token(
                    &routes::order_status(order_id),
                    &json!({"status": status}),
                    &admin,
                )
                .await;
            assert_eq!(res.status, 200);
            assert_eq!(res.body["status"], status);
            assert_eq!(app.item_stock(item).await, 3);
        }
    }

    #[tokio::test]
    async fn cancel_restores_stock_and_uncancel_takes_it_again() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;
        let placed = app.place_order(item, 2).await;
        let order_id = placed.id();
        assert_eq!(app.item_stock(item).await, 3);

        let res = app
            .patch_with_token(
                &routes::order_status(order_id),
                &json!({"status": "canceled"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(app.item_stock(item).await, 5);

        let res = app
            .patch_with_token(
                &routes::order_status(order_id),
                &json!({"status": "processing"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(app.item_stock(item).await, 3);
    }

    #[tokio::test]
    async fn cancel_uncancel_cancel_equals_a_single_cancel() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;
        let placed = app.place_order(item, 2).await;
        let order_id = placed.id();

        for status in ["canceled", "placed", "canceled"] {
            let res = app
                .patch_with_token(
                    &routes::order_status(order_id),
                    &json!({"status": status}),
                    &admin,
                )
                .await;
            assert_eq!(res.status, 200);
        }

        assert_eq!(app.item_stock(item).await, 5);
    }

    #[tokio::test]
    async fn repeating_the_current_status_does_not_double_apply() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 5).await;
        let placed = app.place_order(item, 2).await;
        let order_id = placed.id();

        for _ in 0..2 {
            let res = app
                .patch_with_token(
                    &routes::order_status(order_id),
                    &json!({"status": "canceled"}),
                    &admin,
                )
                .await;
            assert_eq!(res.status, 200);
        }

        assert_eq!(app.item_stock(item).await, 5);
    }

    #[tokio::test]
    async fn uncancel_fails_when_stock_has_been_sold_meanwhile() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("admin").await;
        let item = app.create_item(&admin, "TS-1", "19.90", 2).await;
        let placed = app.place_order(item, 2).await;
        let order_id = placed.id();

        let res = app
            .patch_with_token(
                &routes::order_status(order_id),
                &json!({"status": "canceled"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(app.item_stock(item).await, 2);

        // The restored stock is bought up by someone else.
        let res = app.place_order(item, 1).await;
        assert_eq!(res.status, 201);
        assert_eq!(app.item_stock(item).await, 1);

        let res = app
            .patch_with_token(
                &routes::order_status(order_id),
                &json!({"status": "placed"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.item_stock(item).await, 1);

        let check = app.get_with_token(&routes::order(order_id), &admin).await;
        assert_eq!(check.body["status"], "canceled");
    }
}
