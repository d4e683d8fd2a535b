mod common;

use anyhow::Result;
use serde_json::json;

#[tokio::test]
async fn add_bulk_assigns_distinct_keys() -> Result<()> {
    let server = common::spawn().await?;

    let (status, body) = server
        .post(
            "/admin/comment/addBulk",
            json!({ "data": [{ "comment": "a", "upvoteCount": 1 }, { "comment": "b" }, { "comment": "c" }] }),
        )
        .await?;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["data"], json!({ "count": 3 }));

    let (_, body) = server.post("/admin/comment/list", json!({ "options": { "sort": "id" } })).await?;
    let rows = body["data"]["rows"].as_array().expect("rows");
    let ids: Vec<i64> = rows.iter().filter_map(|r| r["id"].as_i64()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(rows.iter().all(|r| r["addedBy"] == json!(common::PRINCIPAL)));

    Ok(())
}

#[tokio::test]
async fn duplicate_unique_value_rejects_the_whole_batch() -> Result<()> {
    let server = common::spawn().await?;

    let (status, _) = server.post("/admin/patient/create", json!({ "code": "P-1" })).await?;
    assert_eq!(status, 200);

    let (status, body) = server
        .post("/admin/patient/addBulk", json!({ "data": [{ "code": "P-2" }, { "code": "P-1" }] }))
        .await?;
    assert_eq!(status, 500, "{}", body);
    assert_eq!(body["status"], "FAILURE");

    let (_, body) = server.post("/admin/patient/count", json!({})).await?;
    assert_eq!(body["data"], json!({ "count": 1 }));

    Ok(())
}

#[tokio::test]
async fn update_bulk_touches_matching_live_rows() -> Result<()> {
    let server = common::spawn().await?;
    server
        .post(
            "/admin/orderItem/addBulk",
            json!({ "data": [
                { "item": "bolt", "qty": 1, "uom": "pc" },
                { "item": "nut", "qty": 5, "uom": "pc" },
                { "item": "oil", "qty": 2, "uom": "l" }
            ] }),
        )
        .await?;
    server.put("/admin/orderItem/softDelete/2", json!({})).await?;

    let (status, body) = server
        .put("/admin/orderItem/updateBulk", json!({ "filter": { "uom": "pc" }, "data": { "qty": 10 } }))
        .await?;
    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["data"], json!({ "count": 1 }));

    let (_, body) = server.get("/admin/orderItem/1").await?;
    assert_eq!(body["data"]["qty"], json!(10));
    assert_eq!(body["data"]["updatedBy"], json!(common::PRINCIPAL));

    Ok(())
}

#[tokio::test]
async fn delete_many_and_soft_delete_many_report_counts() -> Result<()> {
    let server = common::spawn().await?;
    server
        .post("/admin/task/addBulk", json!({ "data": [{ "name": "a" }, { "name": "b" }, { "name": "c" }] }))
        .await?;

    let (_, body) = server.put("/admin/task/softDeleteMany", json!({ "ids": [1, 2, 99] })).await?;
    assert_eq!(body["data"], json!({ "count": 2 }));

    let (_, body) = server.post("/admin/task/count", json!({})).await?;
    assert_eq!(body["data"], json!({ "count": 1 }));

    let (_, body) = server.post("/admin/task/deleteMany", json!({ "ids": [1, 3] })).await?;
    assert_eq!(body["data"], json!({ "count": 2 }));

    let (_, body) = server
        .post("/admin/task/list", json!({ "isCountOnly": true, "options": { "includeDeleted": true } }))
        .await?;
    assert_eq!(body["data"], json!({ "totalRecords": 1 }));

    let (status, body) = server.post("/admin/task/deleteMany", json!({ "ids": ["x"] })).await?;
    assert_eq!(status, 422);
    assert_eq!(body["message"], "\"ids\" must be an array of numbers");

    Ok(())
}
