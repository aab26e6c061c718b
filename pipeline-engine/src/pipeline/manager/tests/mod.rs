use super::*;
use crate::pipeline::directory::InMemoryDirectory;
use crate::pipeline::storage::PipelineStorage;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shared::models::{Product, User};
use shared::pipeline::{
    LineItem, Opportunity, OpportunityStatus, PipelineCommandPayload, PriceType,
};


fn create_test_manager() -> PipelineManager {
    let storage = PipelineStorage::open_in_memory().unwrap();
    let mut dir = InMemoryDirectory::new();
    dir.insert_product(Product {
        id: "prod-1".to_string(),
        name: "Platform License".to_string(),
        price: dec!(49900),
        price_type: PriceType::Standard,
        is_active: true,
    });
    dir.insert_product(Product {
        id: "prod-2".to_string(),
        name: "Onboarding".to_string(),
        price: dec!(15000),
        price_type: PriceType::Standard,
        is_active: true,
    });
    dir.insert_user(User {
        id: "user-1".to_string(),
        name: "Test Operator".to_string(),
        is_active: true,
    });
    let dir = Arc::new(dir);
    PipelineManager::with_storage(storage, dir.clone(), dir)
}

fn command(payload: PipelineCommandPayload) -> PipelineCommand {
    PipelineCommand {
        command_id: uuid::Uuid::new_v4().to_string(),
        actor_id: "user-1".to_string(),
        actor_name: "Test Operator".to_string(),
        timestamp: 1700000000000,
        payload,
    }
}

/// Seed an opportunity with the given line items directly into storage
fn seed_opportunity(manager: &PipelineManager, id: &str, value: Decimal, line_items: Vec<LineItem>) {
    let opportunity = Opportunity {
        id: id.to_string(),
        name: "Test Deal".to_string(),
        company_ref: Some("company-1".to_string()),
        value,
        status: OpportunityStatus::Open,
        line_items,
        created_at: 0,
        updated_at: 0,
    };
    manager.storage().put_opportunity(&opportunity).unwrap();
}

fn standard_line(product_ref: &str, quantity: i32) -> LineItem {
    LineItem {
        product_ref: product_ref.to_string(),
        description: None,
        quantity,
        price_type: PriceType::Standard,
        unit_price: Decimal::ZERO,
    }
}

// ========================================================================
// Helper: drive an opportunity to a won state with an accepted quote
// ========================================================================

async fn win_opportunity(manager: &PipelineManager, opportunity_id: &str) -> String {
    let response = manager
        .execute_command(command(PipelineCommandPayload::BuildQuote {
            opportunity_id: opportunity_id.to_string(),
            expires_at: None,
            gst_rate: None,
            show_gst: false,
        }))
        .await;
    assert!(response.success, "{:?}", response.error);
    let quote_id = response.record_id.unwrap();

    let response = manager
        .execute_command(command(PipelineCommandPayload::SendQuote {
            quote_id: quote_id.clone(),
        }))
        .await;
    assert!(response.success);

    let response = manager
        .execute_command(command(PipelineCommandPayload::AttachPurchaseOrder {
            quote_id: quote_id.clone(),
            purchase_order: shared::pipeline::PurchaseOrderInput {
                po_number: "PO-1001".to_string(),
                po_value: dec!(4990000),
                po_date: Some(1700000000000),
                document: None,
            },
        }))
        .await;
    assert!(response.success, "{:?}", response.error);

    quote_id
}

/// Win the opportunity and create its contract, returning the contract id
async fn create_contract(manager: &PipelineManager, opportunity_id: &str) -> String {
    win_opportunity(manager, opportunity_id).await;
    let response = manager
        .execute_command(command(PipelineCommandPayload::CreateContract {
            opportunity_id: opportunity_id.to_string(),
        }))
        .await;
    assert!(response.success, "{:?}", response.error);
    response.record_id.unwrap()
}
