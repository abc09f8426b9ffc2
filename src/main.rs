use std::sync::Arc;

use tracing::{error, info, warn, Instrument};

use smm_panel::app_system::{setup_tracing, PanelSystem};
use smm_panel::config::PanelConfig;
use smm_panel::domain::{OrderStatus, ServiceCreate, UserCreate};
use smm_panel::listing::{OrderFilter, StatusFilter, UserFilter};
use smm_panel::notify::TracingNotifier;
use smm_panel::order_form::{Field, OrderType};

fn service(name: &str, rate: f64, min: i64, max: i64, category_id: &str) -> ServiceCreate {
    ServiceCreate {
        name: name.to_string(),
        rate,
        min,
        max,
        is_free: false,
        dripfeed: false,
        refill: true,
        cancel: true,
        category_id: Some(category_id.to_string()),
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = PanelConfig::load().map_err(|e| e.to_string())?;
    setup_tracing(&config.logging);

    info!("Starting panel with in-memory backend");
    let (mut system, backend) = PanelSystem::in_memory(&config, Arc::new(TracingNotifier));

    // Seed an operator account and a small catalog
    let admin = system
        .user_client
        .create_user(UserCreate::new("Admin", "admin@panel.local", "change-me-now"))
        .await
        .map_err(|e| e.to_string())?;
    system.sign_in(admin.id.clone());

    let category = system
        .category_client
        .create_category("Instagram")
        .await
        .map_err(|e| e.to_string())?;
    let polls = system
        .service_client
        .create_service(service("Instagram Poll Votes", 1.5, 10, 5_000, &category.id))
        .await
        .map_err(|e| e.to_string())?;
    let followers = system
        .service_client
        .create_service(ServiceCreate {
            is_free: true,
            ..service("Free Followers Trial", 0.0, 10, 100, &category.id)
        })
        .await
        .map_err(|e| e.to_string())?;

    // Paid poll order through a service-scoped form
    let poll_form = system.order_form_for_service(polls);
    poll_form.with_form(|form| -> Result<(), String> {
        form.set_type(OrderType::Poll);
        form.set_input(Field::Link, "https://instagram.com/p/demo").map_err(|e| e.to_string())?;
        form.set_input(Field::Quantity, "250").map_err(|e| e.to_string())?;
        form.set_input(Field::AnswerNumber, "2").map_err(|e| e.to_string())?;
        Ok(())
    })?;
    let span = tracing::info_span!("order_submission", order_type = "poll");
    match poll_form.submit().instrument(span).await {
        Ok(outcome) => info!(?outcome, "Poll order submitted"),
        Err(e) => error!(error = %e, "Poll order failed"),
    }

    // Free default order: only a username and quantity are needed
    let free_form = system.order_form_for_service(followers);
    free_form.with_form(|form| -> Result<(), String> {
        form.set_input(Field::Link, "@panel.demo").map_err(|e| e.to_string())?;
        form.set_input(Field::Quantity, "50").map_err(|e| e.to_string())?;
        Ok(())
    })?;
    let span = tracing::info_span!("order_submission", order_type = "default");
    match free_form.submit().instrument(span).await {
        Ok(outcome) => info!(?outcome, "Free order submitted"),
        Err(e) => error!(error = %e, "Free order failed"),
    }
    drop((poll_form, free_form));

    // Provider finishes the first order; refill it and cancel the second
    backend
        .set_order_status("1", OrderStatus::Completed)
        .await
        .map_err(|e| e.to_string())?;
    if let Err(e) = system.order_client.refill_orders(&["1".to_string()]).await {
        warn!(error = %e, "Refill failed");
    }
    if let Err(e) = system.order_client.cancel_orders(&["2".to_string()]).await {
        warn!(error = %e, "Cancel failed");
    }

    let dashboard = system.dashboard().await.map_err(|e| e.to_string())?;
    info!(stats = ?dashboard.stats, recent = dashboard.recent.len(), "Dashboard");

    let canceled = OrderFilter {
        search: String::new(),
        status: StatusFilter::Only(OrderStatus::Canceled),
    };
    let page = system.orders_page(&canceled, 1).await.map_err(|e| e.to_string())?;
    info!(total = page.total_items, pages = page.total_pages, "Canceled orders");

    let users = system
        .users_page(&UserFilter::default(), 1)
        .await
        .map_err(|e| e.to_string())?;
    let stats = system.user_stats().await.map_err(|e| e.to_string())?;
    info!(listed = users.items.len(), ?stats, "Users");

    if let Err(e) = system.user_client.delete_user(&admin.id).await {
        info!(error = %e, "Self-deletion refused as expected");
    }

    system.shutdown().await?;
    info!("Panel demo completed successfully");
    Ok(())
}
