//! End-to-end checklists for stock documents and service requests.

use super::helpers::{NOTES, Shop, shop};
use checklist::{
    entity::domain::{
        ServiceRequest, ServiceRequestStatus, StockIssue, StockIssueStatus, StockReceipt,
        StockReceiptStatus, StockTransfer, StockTransferStatus,
    },
    task::{
        domain::{EntityId, EntityRef, EntityType, TaskEventKind},
        services::TaskServiceError,
    },
};
use eyre::ensure;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn approved_receipt_is_received_after_its_checklist(shop: Shop) -> eyre::Result<()> {
    let id = EntityId::new("gr-100");
    shop.entities.stock_receipts.insert(
        StockReceipt::new(id.clone(), "GR-100", "Parts Direct")
            .with_status(StockReceiptStatus::Approved),
    )?;
    let receipt = EntityRef::new(EntityType::StockReceipt, id.clone());

    let tasks = shop
        .checklist(&receipt, "Goods in", &["Count boxes", "Check serials", "Shelve"])
        .await?;
    shop.work_through(&tasks).await?;

    let stored = shop
        .entities
        .stock_receipts
        .get(&id)?
        .ok_or_else(|| eyre::eyre!("receipt should exist"))?;
    ensure!(stored.status() == StockReceiptStatus::Received);
    ensure!(stored.tasks_completed_at().is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submitted_receipt_blocks_task_start(shop: Shop) -> eyre::Result<()> {
    let id = EntityId::new("gr-101");
    shop.entities.stock_receipts.insert(
        StockReceipt::new(id.clone(), "GR-101", "Parts Direct")
            .with_status(StockReceiptStatus::Submitted),
    )?;
    let receipt = EntityRef::new(EntityType::StockReceipt, id);
    let tasks = shop.checklist(&receipt, "Goods in", &["Count boxes"]).await?;
    let first = tasks
        .first()
        .ok_or_else(|| eyre::eyre!("checklist should not be empty"))?;

    let result = shop.service.start_task(first.id(), None).await;
    ensure!(matches!(result, Err(TaskServiceError::PreconditionFailed { .. })));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stock_issue_is_issued_after_picking(shop: Shop) -> eyre::Result<()> {
    let id = EntityId::new("si-100");
    shop.entities
        .stock_issues
        .insert(StockIssue::new(id.clone(), "SI-100", "Ticket T-1001"))?;
    let issue = EntityRef::new(EntityType::StockIssue, id.clone());

    let tasks = shop.checklist(&issue, "Picking", &["Pick", "Pack"]).await?;
    shop.work_through(&tasks).await?;

    let stored = shop
        .entities
        .stock_issues
        .get(&id)?
        .ok_or_else(|| eyre::eyre!("issue should exist"))?;
    ensure!(stored.status() == StockIssueStatus::Issued);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stock_transfer_arrives_after_its_checklist(shop: Shop) -> eyre::Result<()> {
    let id = EntityId::new("tr-100");
    shop.entities.stock_transfers.insert(StockTransfer::new(
        id.clone(),
        "TR-100",
        "Main store",
        "Branch west",
    ))?;
    let transfer = EntityRef::new(EntityType::StockTransfer, id.clone());

    let tasks = shop
        .checklist(&transfer, "Transfer", &["Load van", "Unload van"])
        .await?;
    let first = tasks
        .first()
        .ok_or_else(|| eyre::eyre!("checklist should not be empty"))?;
    shop.service.start_task(first.id(), None).await?;
    let in_transit = shop
        .entities
        .stock_transfers
        .get(&id)?
        .ok_or_else(|| eyre::eyre!("transfer should exist"))?;
    ensure!(in_transit.status() == StockTransferStatus::InTransit);

    shop.service.complete_task(first.id(), None, NOTES).await?;
    let rest = tasks.get(1..).unwrap_or_default();
    shop.work_through(rest).await?;

    let arrived = shop
        .entities
        .stock_transfers
        .get(&id)?
        .ok_or_else(|| eyre::eyre!("transfer should exist"))?;
    ensure!(arrived.status() == StockTransferStatus::Received);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn service_request_is_reviewed_after_assessment(shop: Shop) -> eyre::Result<()> {
    let id = EntityId::new("sr-100");
    shop.entities.service_requests.insert(ServiceRequest::new(
        id.clone(),
        "SR-100",
        "Katherine Johnson",
        "Tablet does not boot",
    ))?;
    let request = EntityRef::new(EntityType::ServiceRequest, id.clone());

    let tasks = shop
        .checklist(&request, "Assessment", &["Triage", "Quote"])
        .await?;
    shop.work_through(&tasks).await?;

    let stored = shop
        .entities
        .service_requests
        .get(&id)?
        .ok_or_else(|| eyre::eyre!("request should exist"))?;
    ensure!(stored.status() == ServiceRequestStatus::Reviewed);
    ensure!(stored.reviewed_at().is_some());

    let timeline: Vec<_> = shop
        .events
        .events()
        .into_iter()
        .filter(|event| event.entity == request)
        .map(|event| event.kind)
        .collect();
    ensure!(matches!(
        timeline.first(),
        Some(TaskEventKind::TasksCreated { count: 2, .. })
    ));
    ensure!(
        timeline
            .iter()
            .filter(|kind| matches!(kind, TaskEventKind::EntityTasksCompleted))
            .count()
            == 1
    );
    Ok(())
}
