use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use payout_widget::flow::ledger::format_amount;
use payout_widget::flow::{
    DetailOption, FlowPhase, InvoiceRecord, PayoutMethod, StepOutcome, TaxForm, TaxFormType,
    WizardStep,
};
use payout_widget::widget::VerificationStep;
use payout_widget::{PayoutWidget, WidgetSettings};

const HELP: &str = "\
Commands:
  status                      show the wizard and theme
  login | logout | restart    session control
  next | back                 move through the wizard
  goto <step>                 jump to a step
  method <name>               choose a payout method
  option <name>               choose a detail option (PayPal, Amazon, ...)
  change-method               reopen the payout method choice
  field <key> <value>         set a form field
  tax <w9|w8> <name> <tin>    submit a certified tax form
  done                        leave the success screen for the dashboard
  payouts                     list payout history and invoices
  invoice-upload <file>       upload an invoice for approval
  invoice <id|number>         open an invoice
  invoice-close               close the open invoice
  style <text>                ask the style assistant
  logo <path>                 attach a logo image to the next style message
  cancel                      cancel a pending style reply
  apply | discard             commit or drop the previewed style
  chat                        show the style conversation
  chat-reset                  clear the conversation
  toggle-step <step>          enable/disable profile, kyc, bank or tax
  toggle-method <name>        enable/disable a payout method
  payouts-only <on|off>       drop or restore the verification steps
  config <json>               apply a config patch
  reset-config                restore the default config
  json                        print the full snapshot as JSON
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let settings = WidgetSettings::from_env();
    eprintln!("💸 Payout Widget v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Reply delay: {}ms", settings.reply_delay.as_millis());
    eprintln!(
        "   Style seed: {}",
        settings
            .style_seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "random".into())
    );
    eprintln!("   Type `help` for commands, `quit` to exit.\n");

    let mut widget = PayoutWidget::new(settings);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprint!("> ");
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }
        let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        if matches!(cmd, "quit" | "exit" | "/quit") {
            break;
        }
        if let Err(e) = run(&mut widget, cmd, arg).await {
            eprintln!("error: {e:#}");
        }
        eprint!("> ");
    }

    widget.cancel_style_request().await;
    eprintln!("bye");
    Ok(())
}

async fn run(widget: &mut PayoutWidget, cmd: &str, arg: &str) -> anyhow::Result<()> {
    match cmd {
        "help" => println!("{HELP}"),
        "status" => print_status(widget).await,
        "json" => {
            let snapshot = widget.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        "login" => {
            widget.login();
            print_status(widget).await;
        }
        "logout" => {
            widget.logout().await;
            println!("Logged out.");
        }
        "restart" => {
            widget.restart().await;
            print_status(widget).await;
        }
        "next" => {
            let outcome = widget.advance()?;
            print_outcome(&outcome);
        }
        "back" => {
            let outcome = widget.retreat();
            print_outcome(&outcome);
        }
        "goto" => {
            let step: WizardStep = arg.parse().map_err(anyhow::Error::msg)?;
            widget.go_to(step)?;
            print_status(widget).await;
        }
        "method" => {
            let method: PayoutMethod = arg.parse().map_err(anyhow::Error::msg)?;
            widget.select_method(method).await?;
            println!("Payout method: {method}");
            if method.requires_detail_option() {
                let options: Vec<String> =
                    method.detail_options().iter().map(|o| o.to_string()).collect();
                println!("Choose one of: {}", options.join(", "));
            }
        }
        "option" => {
            let option: DetailOption = arg.parse().map_err(anyhow::Error::msg)?;
            widget.select_detail_option(option)?;
            println!("Detail option: {option}");
        }
        "change-method" => {
            widget.change_payout_method()?;
            print_status(widget).await;
        }
        "field" => {
            let (key, value) = arg
                .split_once(' ')
                .context("usage: field <key> <value>")?;
            widget.update_form_field(key, value.trim());
        }
        "tax" => {
            let mut parts = arg.splitn(3, ' ');
            let form_type = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                Some("w9") => TaxFormType::W9,
                Some("w8") => TaxFormType::W8,
                _ => anyhow::bail!("usage: tax <w9|w8> <name> <tin>"),
            };
            let (name, tax_id) = match (parts.next(), parts.next()) {
                (Some(name), tin) => (name.to_string(), tin.unwrap_or("").to_string()),
                _ => anyhow::bail!("usage: tax <w9|w8> <name> <tin>"),
            };
            let form = TaxForm {
                form_type,
                name,
                tax_id,
                certified: true,
                ..TaxForm::default()
            };
            let outcome = widget.submit_tax_form(&form)?;
            print_outcome(&outcome);
        }
        "done" => {
            widget.dismiss_success()?;
            print_status(widget).await;
        }
        "payouts" => {
            let ledger = widget.flow().ledger();
            for p in &ledger.payouts {
                println!(
                    "{}  {:>12}  {:<18} {}  {}",
                    p.date,
                    format_amount(p.amount),
                    p.status.label(),
                    p.invoice,
                    p.method
                );
            }
            for i in &ledger.uploaded_invoices {
                println!(
                    "{}  {:>12}  {:<18} {}  (uploaded)",
                    i.date,
                    "-",
                    i.status.label(),
                    i.invoice
                );
            }
            println!("Total paid: {}", format_amount(ledger.total_paid()));
        }
        "invoice-upload" => {
            let record = widget.upload_invoice(arg)?;
            println!("{} uploaded ({}).", record.invoice, record.status);
        }
        "invoice" => {
            let record = widget.view_invoice(arg)?;
            print_invoice(&record);
        }
        "invoice-close" => {
            if !widget.close_invoice() {
                println!("No invoice open.");
            }
        }
        "style" => {
            eprintln!("{}", payout_widget::style::chat::LOADING_TEXT);
            let preview = widget.request_style(arg).await?;
            if let Some(reply) = widget.chat().messages().await.last() {
                println!("{}", reply.content);
            }
            println!(
                "Preview: {} (primary {}, accent {}, radius {}). Type `apply` to use it.",
                preview.preset_name.as_deref().unwrap_or("custom"),
                preview.theme.primary_color,
                preview.theme.accent_color,
                preview.theme.border_radius
            );
        }
        "logo" => {
            let bytes = tokio::fs::read(arg)
                .await
                .with_context(|| format!("reading {arg}"))?;
            widget.attach_logo(mime_for(arg), bytes)?;
            println!("Logo attached. Send a `style` message (text optional).");
        }
        "cancel" => {
            if widget.cancel_style_request().await {
                println!("Style request cancelled.");
            } else {
                println!("Nothing pending.");
            }
        }
        "apply" => {
            let key = widget.apply_style().await?;
            println!("Style applied (widget key {key}).");
        }
        "discard" => {
            if widget.discard_style() {
                println!("Preview discarded.");
            }
        }
        "chat" => {
            for m in widget.chat().messages().await {
                println!("[{:?}] {}", m.role, m.content);
            }
        }
        "chat-reset" => widget.reset_chat().await,
        "toggle-step" => {
            let step: VerificationStep = arg.parse().map_err(anyhow::Error::msg)?;
            widget.toggle_step(step).await;
            print_status(widget).await;
        }
        "toggle-method" => {
            let method: PayoutMethod = arg.parse().map_err(anyhow::Error::msg)?;
            widget.toggle_payout_method(method).await;
            let enabled = widget.config().await.is_method_enabled(method);
            println!("{method}: {}", if enabled { "enabled" } else { "disabled" });
        }
        "payouts-only" => {
            let enabled = match arg {
                "on" | "true" | "1" => true,
                "off" | "false" | "0" => false,
                _ => anyhow::bail!("usage: payouts-only <on|off>"),
            };
            widget.set_payouts_only_mode(enabled).await;
            print_status(widget).await;
        }
        "config" => {
            let value: serde_json::Value =
                serde_json::from_str(arg).context("config patch must be JSON")?;
            widget.update_config_json(value).await?;
            print_status(widget).await;
        }
        "reset-config" => {
            widget.reset_config().await;
            print_status(widget).await;
        }
        other => anyhow::bail!("unknown command `{other}` (try `help`)"),
    }
    Ok(())
}

async fn print_status(widget: &PayoutWidget) {
    let snapshot = widget.snapshot().await;
    let steps: Vec<String> = snapshot
        .steps
        .iter()
        .map(|s| {
            if Some(*s) == snapshot.current_step {
                format!("[{s}]")
            } else {
                s.to_string()
            }
        })
        .collect();
    println!("Phase: {}", widget.flow().phase());
    println!("Steps: {}", steps.join(" → "));
    if let Some(summary) = snapshot.session.payout_summary() {
        println!("Payout: {summary}");
    }
    match widget.flow().phase() {
        FlowPhase::Success => println!("Onboarding complete. Type `done` for the dashboard."),
        FlowPhase::Dashboard => println!(
            "Dashboard: {} payouts, {} paid. Type `payouts` to list them.",
            snapshot.session.ledger.payouts.len(),
            format_amount(snapshot.session.ledger.total_paid())
        ),
        _ => {}
    }
    let theme = &snapshot.config.theme;
    println!(
        "Theme: primary {} accent {} radius {} (widget key {})",
        theme.primary_color, theme.accent_color, theme.border_radius, snapshot.widget_key
    );
}

fn print_outcome(outcome: &StepOutcome) {
    match outcome {
        StepOutcome::Unchanged => println!("(no change)"),
        StepOutcome::Moved { from, to } => println!("{} → {}", from.title(), to.title()),
        StepOutcome::Completed { summary } => match summary {
            Some(s) => println!("Onboarding complete. Payouts go to {s}."),
            None => println!("Onboarding complete."),
        },
    }
}

fn print_invoice(invoice: &InvoiceRecord) {
    println!("Invoice {} ({})", invoice.invoice, invoice.status);
    println!("  Date:   {}", invoice.date);
    println!("  Amount: {}", format_amount(invoice.amount));
    println!("  {}", invoice.description);
    if let Some(file) = &invoice.file_name {
        println!("  File:   {file}");
    }
}

fn mime_for(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
