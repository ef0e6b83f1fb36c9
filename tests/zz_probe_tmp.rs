//! TEMPORARY diagnostic probe — delete before commit
mod common;

use common::TestEnv;
use souk_server::db::models::{FlagType, OrderLine};


#[tokio::test]
async fn probe() {
    let env = TestEnv::new().await;
    let buyer = env.seed_buyer("buyer@test.com", "Cairo").await;
    let seller = env.seed_seller("seller@test.com", None).await;
    let product = env.seed_product(&seller, 10.0, 10).await;
    let order = env
        .orders
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
        .unwrap();
    let order_id = order.id.unwrap();

    let flag = env
        .flags
        .create(
            seller.clone(),
            buyer.clone(),
            order_id.clone(),
            "r".to_string(),
            FlagType::SellerFlaggingBuyer,
        )
        .await
        .unwrap();
    let flag_id = flag.id.clone().unwrap();

    // What shape is the stored flag?
    let raw: Vec<String> = env
        .db
        .query("SELECT VALUE <string>`type` + \" | \" + <string>`order` FROM flag")
        .await
        .unwrap()
        .take(0)
        .unwrap();
    println!("STORED FLAGS: {raw:?}");

    // Does the dup-check WHERE clause match?
    let m: Vec<String> = env
        .db
        .query("SELECT VALUE <string>id FROM flag WHERE `order` = $order AND `type` = $kind LIMIT 1")
        .bind(("order", order_id.clone()))
        .bind(("kind", FlagType::SellerFlaggingBuyer))
        .await
        .unwrap()
        .take(0)
        .unwrap();
    println!("DUP MATCH: {m:?}");

    // How does the bound enum serialize?
    let k: Option<String> = env
        .db
        .query("RETURN <string>$kind")
        .bind(("kind", FlagType::SellerFlaggingBuyer))
        .await
        .unwrap()
        .take(0)
        .unwrap();
    println!("BOUND KIND: {k:?}");

    // The delete transaction, statement by statement
    let mut resp = env
        .db
        .query(
            "BEGIN TRANSACTION;\n\
             LET $f = (SELECT * FROM ONLY $id);\n\
             IF $f == NONE { THROW 'flag_missing' };\n\
             DELETE $id;\n\
             UPDATE $f.reported SET flags_count = math::max(flags_count - 1, 0);\n\
             COMMIT TRANSACTION",
        )
        .bind(("id", flag_id.clone()))
        .await
        .unwrap();
    let errs = resp.take_errors();
    println!("DELETE TX ERRORS: {errs:?}");

    // The dup-check transaction pieces
    let mut resp2 = env
        .db
        .query(
            "BEGIN TRANSACTION;\n\
             LET $dup = (SELECT id FROM flag WHERE `order` = $order AND `type` = $kind LIMIT 1);\n\
             RETURN array::len($dup);\n\
             IF array::len($dup) > 0 { THROW 'duplicate_flag' };\n\
             COMMIT TRANSACTION",
        )
        .bind(("order", order_id.clone()))
        .bind(("kind", FlagType::SellerFlaggingBuyer))
        .await
        .unwrap();
    let errs2 = resp2.take_errors();
    println!("DUP TX ERRORS: {errs2:?}");
    let len: Option<i64> = resp2.take(1).unwrap_or(None);
    println!("DUP TX LEN: {len:?}");

    // math::max arg forms
    let mx: Option<i64> = env
        .db
        .query("RETURN math::max([3 - 1, 0])")
        .await
        .unwrap()
        .take(0)
        .unwrap();
    println!("MATH MAX ARRAY: {mx:?}");

    // LET + array::len outside a transaction
    let mut resp3 = env
        .db
        .query(
            "LET $dup = (SELECT id FROM flag WHERE `order` = $order AND `type` = $kind LIMIT 1);\n\
             RETURN array::len($dup);\n\
             RETURN type::string($dup);",
        )
        .bind(("order", order_id.clone()))
        .bind(("kind", FlagType::SellerFlaggingBuyer))
        .await
        .unwrap();
    println!("NOTX ERRORS: {:?}", resp3.take_errors());
    let l: Option<i64> = resp3.take(1).unwrap_or(None);
    let s: Option<String> = resp3.take(2).unwrap_or(None);
    println!("NOTX LEN: {l:?} DUPVAL: {s:?}");

    // IF/THROW outside a transaction
    let mut resp4 = env
        .db
        .query(
            "LET $dup = (SELECT id FROM flag WHERE `order` = $order AND `type` = $kind LIMIT 1);\n\
             IF array::len($dup) > 0 { THROW 'duplicate_flag' };",
        )
        .bind(("order", order_id.clone()))
        .bind(("kind", FlagType::SellerFlaggingBuyer))
        .await
        .unwrap();
    println!("NOTX IF ERRORS: {:?}", resp4.take_errors());

    // Exact create-shaped transaction (no CREATE/UPDATE side effects needed
    // to see whether the THROW fires)
    let mut resp5 = env
        .db
        .query(
            "BEGIN TRANSACTION;\n\
             LET $dup = (SELECT id FROM flag WHERE `order` = $order AND `type` = $kind LIMIT 1);\n\
             IF array::len($dup) > 0 { THROW 'duplicate_flag' };\n\
             COMMIT TRANSACTION",
        )
        .bind(("order", order_id.clone()))
        .bind(("kind", FlagType::SellerFlaggingBuyer))
        .await
        .unwrap();
    println!("TX IF ERRORS: {:?}", resp5.take_errors());

    // And via the repo itself: a second create should be a duplicate
    let dup = env
        .flags
        .create(
            seller.clone(),
            buyer.clone(),
            order_id.clone(),
            "again".to_string(),
            FlagType::SellerFlaggingBuyer,
        )
        .await;
    println!("REPO DUP RESULT: {:?}", dup.map(|f| f.id));
}
