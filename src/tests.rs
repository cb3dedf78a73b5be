#[cfg(test)]
mod integration_tests {
    use crate::handlers::budget_pools::{CategoryInput, CreateBudgetPoolRequest};
    use crate::handlers::charge_outs::{ChargeOutItemInput, CreateChargeOutRequest};
    use crate::handlers::expenses::{CreateExpenseRequest, ExpenseItemInput};
    use crate::handlers::om_expenses::{
        CreateOmExpenseRequest, MonthlyRecordInput, UpdateMonthlyRecordsRequest,
    };
    use crate::handlers::projects::CreateProjectRequest;
    use crate::handlers::proposals::{ApproveProposalRequest, CreateProposalRequest};
    use crate::handlers::purchase_orders::{CreatePurchaseOrderRequest, PurchaseOrderItemInput};
    use crate::handlers::TransitionBody;
    use crate::schemas::ApiResponse;
    use crate::test_utils::test_utils::{
        setup_test_app, MANAGER_ID, OP_CO_ID, SUPERVISOR_ID, VENDOR_ID,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(value: &serde_json::Value) -> Decimal {
        Decimal::from_str(value.as_str().expect("expected decimal string"))
            .expect("expected parseable decimal")
    }

    fn submit_body(actor_user_id: i32) -> TransitionBody {
        TransitionBody {
            actor_user_id,
            note: None,
            expected_version: None,
        }
    }

    /// Create a budget pool with a single category and a project inside it.
    /// Returns (pool_id, category_id, project_id).
    async fn seed_pool_and_project(server: &TestServer, total: i64) -> (i32, i32, i32) {
        let response = server
            .post("/api/v1/budget-pools")
            .json(&CreateBudgetPoolRequest {
                name: "IT Budget FY2026".to_string(),
                fiscal_year: 2026,
                currency_code: "USD".to_string(),
                categories: vec![CategoryInput {
                    name: "Infrastructure".to_string(),
                    code: "INFRA".to_string(),
                    total_amount: Decimal::from(total),
                }],
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let pool_id = body.data["id"].as_i64().unwrap() as i32;

        let response = server.get(&format!("/api/v1/budget-pools/{}", pool_id)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        let category_id = body.data["categories"][0]["category_id"].as_i64().unwrap() as i32;

        let response = server
            .post("/api/v1/projects")
            .json(&CreateProjectRequest {
                name: "Datacenter refresh".to_string(),
                category_id,
                pool_id,
                manager_id: MANAGER_ID,
                supervisor_id: SUPERVISOR_ID,
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let project_id = body.data["id"].as_i64().unwrap() as i32;

        (pool_id, category_id, project_id)
    }

    /// Create a proposal and take it through submit + approve.
    async fn approved_proposal(server: &TestServer, project_id: i32, amount: i64) -> i32 {
        let response = server
            .post("/api/v1/proposals")
            .json(&CreateProposalRequest {
                project_id,
                title: "Budget request".to_string(),
                amount: Decimal::from(amount),
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let proposal_id = body.data["id"].as_i64().unwrap() as i32;

        server
            .post(&format!("/api/v1/proposals/{}/submit", proposal_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);
        server
            .post(&format!("/api/v1/proposals/{}/approve", proposal_id))
            .json(&ApproveProposalRequest {
                actor_user_id: SUPERVISOR_ID,
                note: None,
                expected_version: None,
                approved_amount: None,
            })
            .await
            .assert_status(StatusCode::OK);

        proposal_id
    }

    /// Create a purchase order with a single line and take it through
    /// submit + approve. Returns the purchase order id.
    async fn approved_purchase_order(server: &TestServer, project_id: i32, total: i64) -> i32 {
        let response = server
            .post("/api/v1/purchase-orders")
            .json(&CreatePurchaseOrderRequest {
                project_id,
                vendor_id: VENDOR_ID,
                po_number: format!("PO-{}-001", project_id),
                items: vec![PurchaseOrderItemInput {
                    name: "Rack servers".to_string(),
                    quantity: 1,
                    unit_price: Decimal::from(total),
                }],
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let po_id = body.data["id"].as_i64().unwrap() as i32;

        server
            .post(&format!("/api/v1/purchase-orders/{}/submit", po_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);
        server
            .post(&format!("/api/v1/purchase-orders/{}/approve", po_id))
            .json(&submit_body(SUPERVISOR_ID))
            .await
            .assert_status(StatusCode::OK);

        po_id
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_budget_pool_with_categories() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/budget-pools")
            .json(&CreateBudgetPoolRequest {
                name: "IT Budget FY2026".to_string(),
                fiscal_year: 2026,
                currency_code: "USD".to_string(),
                categories: vec![
                    CategoryInput {
                        name: "Infrastructure".to_string(),
                        code: "INFRA".to_string(),
                        total_amount: Decimal::from(600_000),
                    },
                    CategoryInput {
                        name: "Software".to_string(),
                        code: "SW".to_string(),
                        total_amount: Decimal::from(400_000),
                    },
                ],
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert!(body.success);
        let pool_id = body.data["id"].as_i64().unwrap();

        // A freshly created pool has no consumption yet
        let response = server.get(&format!("/api/v1/budget-pools/{}", pool_id)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(dec(&body.data["total_amount"]), Decimal::from(1_000_000));
        assert_eq!(dec(&body.data["used_amount"]), Decimal::ZERO);
        assert!(body.data["utilization"].is_null());
        assert_eq!(body.data["categories"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_budget_pool_requires_categories() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/budget-pools")
            .json(&CreateBudgetPoolRequest {
                name: "Empty pool".to_string(),
                fiscal_year: 2026,
                currency_code: "USD".to_string(),
                categories: vec![],
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_full_procurement_cycle() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (pool_id, category_id, project_id) = seed_pool_and_project(&server, 1_000_000).await;

        // Proposal for 100,000 approved: the project budget is credited
        let proposal_id = approved_proposal(&server, project_id, 100_000).await;

        let response = server.get(&format!("/api/v1/proposals/{}", proposal_id)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "Approved");
        assert_eq!(dec(&body.data["approved_amount"]), Decimal::from(100_000));
        assert_eq!(body.data["approved_by"].as_i64().unwrap() as i32, SUPERVISOR_ID);

        let response = server.get(&format!("/api/v1/projects/{}", project_id)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(dec(&body.data["approved_budget"]), Decimal::from(100_000));

        // Purchase order for 50,000, then an invoice against it
        let po_id = approved_purchase_order(&server, project_id, 50_000).await;

        let response = server
            .post("/api/v1/expenses")
            .json(&CreateExpenseRequest {
                purchase_order_id: po_id,
                budget_category_id: category_id,
                invoice_number: "INV-1001".to_string(),
                invoice_date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
                items: vec![ExpenseItemInput {
                    name: "Rack servers".to_string(),
                    amount: Decimal::from(50_000),
                }],
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let expense_id = body.data["id"].as_i64().unwrap() as i32;
        assert_eq!(dec(&body.data["total_amount"]), Decimal::from(50_000));

        server
            .post(&format!("/api/v1/expenses/{}/submit", expense_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);
        server
            .post(&format!("/api/v1/expenses/{}/approve", expense_id))
            .json(&submit_body(SUPERVISOR_ID))
            .await
            .assert_status(StatusCode::OK);

        // Approval consumed the category budget
        let response = server.get(&format!("/api/v1/summaries/pools/{}", pool_id)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(dec(&body.data["used_amount"]), Decimal::from(50_000));
        assert_eq!(dec(&body.data["utilization"]), Decimal::from_str("0.05").unwrap());

        // Marking the invoice paid must not consume the budget again
        server
            .post(&format!("/api/v1/expenses/{}/mark-paid", expense_id))
            .json(&submit_body(SUPERVISOR_ID))
            .await
            .assert_status(StatusCode::OK);

        let response = server.get(&format!("/api/v1/summaries/pools/{}", pool_id)).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(dec(&body.data["used_amount"]), Decimal::from(50_000));
    }

    #[tokio::test]
    async fn test_proposal_approval_requires_supervisor() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, _, project_id) = seed_pool_and_project(&server, 1_000_000).await;

        let response = server
            .post("/api/v1/proposals")
            .json(&CreateProposalRequest {
                project_id,
                title: "Budget request".to_string(),
                amount: Decimal::from(100_000),
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let proposal_id = body.data["id"].as_i64().unwrap();

        server
            .post(&format!("/api/v1/proposals/{}/submit", proposal_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);

        // A project manager cannot approve
        let response = server
            .post(&format!("/api/v1/proposals/{}/approve", proposal_id))
            .json(&ApproveProposalRequest {
                actor_user_id: MANAGER_ID,
                note: None,
                expected_version: None,
                approved_amount: None,
            })
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // Nothing changed on the proposal or the project
        let response = server.get(&format!("/api/v1/proposals/{}", proposal_id)).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "PendingApproval");

        let response = server.get(&format!("/api/v1/projects/{}", project_id)).await;
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(dec(&body.data["approved_budget"]), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_proposal_rejection_requires_reason() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, _, project_id) = seed_pool_and_project(&server, 1_000_000).await;

        let response = server
            .post("/api/v1/proposals")
            .json(&CreateProposalRequest {
                project_id,
                title: "Budget request".to_string(),
                amount: Decimal::from(100_000),
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let proposal_id = body.data["id"].as_i64().unwrap();

        server
            .post(&format!("/api/v1/proposals/{}/submit", proposal_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);

        // Rejecting without a reason is a bad request
        let response = server
            .post(&format!("/api/v1/proposals/{}/reject", proposal_id))
            .json(&submit_body(SUPERVISOR_ID))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post(&format!("/api/v1/proposals/{}/reject", proposal_id))
            .json(&TransitionBody {
                actor_user_id: SUPERVISOR_ID,
                note: Some("Quote is out of date".to_string()),
                expected_version: None,
            })
            .await;
        response.assert_status(StatusCode::OK);

        // The reason is kept as a comment on the proposal
        let response = server
            .get(&format!("/api/v1/proposals/{}/comments", proposal_id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        let comments = body.data.as_array().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["content"], "Quote is out of date");
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, _, project_id) = seed_pool_and_project(&server, 1_000_000).await;

        let response = server
            .post("/api/v1/proposals")
            .json(&CreateProposalRequest {
                project_id,
                title: "Budget request".to_string(),
                amount: Decimal::from(100_000),
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let proposal_id = body.data["id"].as_i64().unwrap();

        // Submit bumps the version past 0
        server
            .post(&format!("/api/v1/proposals/{}/submit", proposal_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .post(&format!("/api/v1/proposals/{}/approve", proposal_id))
            .json(&ApproveProposalRequest {
                actor_user_id: SUPERVISOR_ID,
                note: None,
                expected_version: Some(0),
                approved_amount: None,
            })
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_transition_returns_bad_request() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, _, project_id) = seed_pool_and_project(&server, 1_000_000).await;

        let response = server
            .post("/api/v1/proposals")
            .json(&CreateProposalRequest {
                project_id,
                title: "Budget request".to_string(),
                amount: Decimal::from(100_000),
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let proposal_id = body.data["id"].as_i64().unwrap();

        // A draft proposal cannot be approved directly
        let response = server
            .post(&format!("/api/v1/proposals/{}/approve", proposal_id))
            .json(&ApproveProposalRequest {
                actor_user_id: SUPERVISOR_ID,
                note: None,
                expected_version: None,
                approved_amount: None,
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_expense_requires_approved_purchase_order() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, category_id, project_id) = seed_pool_and_project(&server, 1_000_000).await;

        // Purchase order stays in draft
        let response = server
            .post("/api/v1/purchase-orders")
            .json(&CreatePurchaseOrderRequest {
                project_id,
                vendor_id: VENDOR_ID,
                po_number: "PO-DRAFT-001".to_string(),
                items: vec![PurchaseOrderItemInput {
                    name: "Switches".to_string(),
                    quantity: 4,
                    unit_price: Decimal::from(2_500),
                }],
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let po_id = body.data["id"].as_i64().unwrap() as i32;

        let response = server
            .post("/api/v1/expenses")
            .json(&CreateExpenseRequest {
                purchase_order_id: po_id,
                budget_category_id: category_id,
                invoice_number: "INV-2001".to_string(),
                invoice_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                items: vec![ExpenseItemInput {
                    name: "Switches".to_string(),
                    amount: Decimal::from(10_000),
                }],
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_expense_requires_existing_category() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, category_id, project_id) = seed_pool_and_project(&server, 1_000_000).await;
        let po_id = approved_purchase_order(&server, project_id, 50_000).await;

        let response = server
            .post("/api/v1/expenses")
            .json(&CreateExpenseRequest {
                purchase_order_id: po_id,
                budget_category_id: category_id + 9999,
                invoice_number: "INV-3001".to_string(),
                invoice_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                items: vec![ExpenseItemInput {
                    name: "Switches".to_string(),
                    amount: Decimal::from(10_000),
                }],
            })
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_om_expense_requires_existing_category() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, category_id, _) = seed_pool_and_project(&server, 1_000_000).await;

        let response = server
            .post("/api/v1/om-expenses")
            .json(&CreateOmExpenseRequest {
                actor_user_id: MANAGER_ID,
                name: "Circuit leases".to_string(),
                category_id: category_id + 9999,
                fiscal_year: 2026,
                budget_amount: Decimal::from(120_000),
                monthly_budgets: None,
            })
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_proposal_delete_only_while_draft() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, _, project_id) = seed_pool_and_project(&server, 1_000_000).await;

        let response = server
            .post("/api/v1/proposals")
            .json(&CreateProposalRequest {
                project_id,
                title: "Budget request".to_string(),
                amount: Decimal::from(10_000),
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let proposal_id = body.data["id"].as_i64().unwrap();

        server
            .post(&format!("/api/v1/proposals/{}/submit", proposal_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .delete(&format!("/api/v1/proposals/{}", proposal_id))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_proposal_history_is_ordered() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, _, project_id) = seed_pool_and_project(&server, 1_000_000).await;

        let response = server
            .post("/api/v1/proposals")
            .json(&CreateProposalRequest {
                project_id,
                title: "Budget request".to_string(),
                amount: Decimal::from(100_000),
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let proposal_id = body.data["id"].as_i64().unwrap();

        server
            .post(&format!("/api/v1/proposals/{}/submit", proposal_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);
        server
            .post(&format!("/api/v1/proposals/{}/request-more-info", proposal_id))
            .json(&TransitionBody {
                actor_user_id: SUPERVISOR_ID,
                note: Some("Please attach the vendor quote".to_string()),
                expected_version: None,
            })
            .await
            .assert_status(StatusCode::OK);
        server
            .post(&format!("/api/v1/proposals/{}/submit", proposal_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);
        server
            .post(&format!("/api/v1/proposals/{}/approve", proposal_id))
            .json(&ApproveProposalRequest {
                actor_user_id: SUPERVISOR_ID,
                note: None,
                expected_version: None,
                approved_amount: None,
            })
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/v1/proposals/{}/history", proposal_id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        let actions: Vec<&str> = body
            .data
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["action"].as_str().unwrap())
            .collect();
        assert_eq!(
            actions,
            vec!["SUBMITTED", "MORE_INFO_REQUIRED", "SUBMITTED", "APPROVED"]
        );
    }

    #[tokio::test]
    async fn test_charge_out_confirm_and_revert() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, category_id, project_id) = seed_pool_and_project(&server, 1_000_000).await;
        approved_proposal(&server, project_id, 100_000).await;
        let po_id = approved_purchase_order(&server, project_id, 30_000).await;

        let response = server
            .post("/api/v1/expenses")
            .json(&CreateExpenseRequest {
                purchase_order_id: po_id,
                budget_category_id: category_id,
                invoice_number: "INV-3001".to_string(),
                invoice_date: NaiveDate::from_ymd_opt(2026, 5, 10).unwrap(),
                items: vec![ExpenseItemInput {
                    name: "Storage array".to_string(),
                    amount: Decimal::from(30_000),
                }],
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let expense_id = body.data["id"].as_i64().unwrap() as i32;

        server
            .post(&format!("/api/v1/expenses/{}/submit", expense_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);
        server
            .post(&format!("/api/v1/expenses/{}/approve", expense_id))
            .json(&submit_body(SUPERVISOR_ID))
            .await
            .assert_status(StatusCode::OK);

        let response = server
            .post("/api/v1/charge-outs")
            .json(&CreateChargeOutRequest {
                project_id,
                op_co_id: OP_CO_ID,
                items: vec![ChargeOutItemInput {
                    expense_id,
                    amount: Decimal::from(30_000),
                }],
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let charge_out_id = body.data["id"].as_i64().unwrap() as i32;

        server
            .post(&format!("/api/v1/charge-outs/{}/submit", charge_out_id))
            .json(&submit_body(MANAGER_ID))
            .await
            .assert_status(StatusCode::OK);
        let response = server
            .post(&format!("/api/v1/charge-outs/{}/confirm", charge_out_id))
            .json(&submit_body(SUPERVISOR_ID))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "Confirmed");
        assert_eq!(body.data["confirmed_by"].as_i64().unwrap() as i32, SUPERVISOR_ID);

        // Confirmed totals show up in the operating company rollup
        let response = server.get("/api/v1/summaries/opco").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(dec(&body.data["total_confirmed"]), Decimal::from(30_000));
        let companies = body.data["companies"].as_array().unwrap();
        assert_eq!(companies[0]["code"], "NWL");
        assert_eq!(dec(&companies[0]["confirmed_amount"]), Decimal::from(30_000));

        // Revert puts it back in draft and clears the confirmation stamp
        let response = server
            .post(&format!("/api/v1/charge-outs/{}/revert", charge_out_id))
            .json(&submit_body(SUPERVISOR_ID))
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(body.data["status"], "Draft");
        assert!(body.data["confirmed_by"].is_null());
    }

    #[tokio::test]
    async fn test_om_expense_monthly_records() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, category_id, _) = seed_pool_and_project(&server, 1_000_000).await;

        let response = server
            .post("/api/v1/om-expenses")
            .json(&CreateOmExpenseRequest {
                actor_user_id: MANAGER_ID,
                name: "Circuit leases".to_string(),
                category_id,
                fiscal_year: 2026,
                budget_amount: Decimal::from(120_000),
                monthly_budgets: Some(vec![Decimal::from(10_000); 12]),
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<serde_json::Value> = response.json();
        let om_id = body.data["id"].as_i64().unwrap() as i32;
        assert_eq!(dec(&body.data["actual_spent"]), Decimal::ZERO);
        assert_eq!(body.data["monthly_records"].as_array().unwrap().len(), 12);

        // Book actuals for two months; the parent total is recomputed
        let response = server
            .put(&format!("/api/v1/om-expenses/{}/monthly-records", om_id))
            .json(&UpdateMonthlyRecordsRequest {
                actor_user_id: MANAGER_ID,
                expected_version: None,
                records: vec![
                    MonthlyRecordInput {
                        month: 1,
                        budget_amount: None,
                        actual_amount: Some(Decimal::from(10_000)),
                    },
                    MonthlyRecordInput {
                        month: 2,
                        budget_amount: None,
                        actual_amount: Some(Decimal::from(25_000)),
                    },
                ],
            })
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(dec(&body.data["actual_spent"]), Decimal::from(35_000));

        let response = server.get("/api/v1/summaries/om?fiscal_year=2026").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<serde_json::Value> = response.json();
        assert_eq!(dec(&body.data["total_budget"]), Decimal::from(120_000));
        assert_eq!(dec(&body.data["total_actual"]), Decimal::from(35_000));
    }

    #[tokio::test]
    async fn test_om_monthly_record_month_validation() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (_, category_id, _) = seed_pool_and_project(&server, 1_000_000).await;

        let response = server
            .post("/api/v1/om-expenses")
            .json(&CreateOmExpenseRequest {
                actor_user_id: MANAGER_ID,
                name: "Circuit leases".to_string(),
                category_id,
                fiscal_year: 2026,
                budget_amount: Decimal::from(120_000),
                monthly_budgets: None,
            })
            .await;
        let body: ApiResponse<serde_json::Value> = response.json();
        let om_id = body.data["id"].as_i64().unwrap() as i32;

        let response = server
            .put(&format!("/api/v1/om-expenses/{}/monthly-records", om_id))
            .json(&UpdateMonthlyRecordsRequest {
                actor_user_id: MANAGER_ID,
                expected_version: None,
                records: vec![MonthlyRecordInput {
                    month: 13,
                    budget_amount: None,
                    actual_amount: Some(Decimal::from(1_000)),
                }],
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_missing_pool_returns_not_found() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/budget-pools/999").await;

        response.assert_status(StatusCode::NOT_FOUND);
    }
}
