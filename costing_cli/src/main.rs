//! # Costing CLI
//!
//! Command-line front end for the estimation, weight and conversion
//! calculators. Results print as a readable summary followed by their
//! JSON form; errors print the same way and exit non-zero.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use costing_core::calculations::process_chart::unique_operations;
use costing_core::calculations::weight::compute_weight;
use costing_core::calculations::{
    build_chart, collections, CalculationItem, ChartFilter, EstimationInput, EstimationRecord,
    ProcessRecord, ShapeKind, WeightInput, WeightRecord,
};
use costing_core::config::EstimatorConfig;
use costing_core::file_io::{load_or_create_workbook, load_workbook, save_workbook, FileLock};
use costing_core::forms::WeightForm;
use costing_core::materials::MaterialLibrary;
use costing_core::units::{ConversionQuantity, ConversionRecord, UnitCategory};
use costing_core::{CalcError, CalcResult, RecordStore};

#[derive(Parser)]
#[command(name = "costing")]
#[command(
    about = "Manufacturing cost estimation, part weight and unit conversion",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Also print the JSON form of the result
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a value between units of one category
    Convert {
        /// length, weight, temperature or volume
        category: UnitCategory,
        from: String,
        to: String,
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Workbook to record the conversion in
        #[arg(long, value_name = "WORKBOOK")]
        save: Option<PathBuf>,
    },
    /// Compute a part weight from its shape
    Weight {
        #[arg(long)]
        shape: Option<ShapeKind>,
        #[arg(long)]
        length: Option<f64>,
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        thickness: Option<f64>,
        /// Outer diameter (pipe, round)
        #[arg(long)]
        od: Option<f64>,
        /// Inner diameter (pipe)
        #[arg(long)]
        id: Option<f64>,
        /// Across flats (hexagon)
        #[arg(long)]
        af: Option<f64>,
        /// Specific gravity in g/cm³
        #[arg(long, conflicts_with = "material")]
        sg: Option<f64>,
        /// Material name from the library
        #[arg(long)]
        material: Option<String>,
        /// Workbook whose saved materials extend the library, and where
        /// the result is recorded
        #[arg(long, value_name = "WORKBOOK")]
        save: Option<PathBuf>,
    },
    /// Price an estimation read from a JSON file
    Estimate {
        input: PathBuf,
        #[arg(long, value_name = "WORKBOOK")]
        save: Option<PathBuf>,
    },
    /// Record a process cycle time in a workbook
    Process {
        workbook: PathBuf,
        #[arg(long)]
        customer: String,
        #[arg(long)]
        operation: String,
        #[arg(long)]
        cycle_time: f64,
        #[arg(long)]
        process_name: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        part: Option<String>,
        #[arg(long)]
        drawing: Option<String>,
    },
    /// Summarise recorded cycle times for a customer and operation
    Chart {
        workbook: PathBuf,
        #[arg(long)]
        customer: String,
        /// Omit to list the operations on record
        #[arg(long)]
        operation: Option<String>,
        #[arg(long)]
        project: Option<String>,
        /// Case-insensitive part name fragment
        #[arg(long)]
        part: Option<String>,
        #[arg(long)]
        drawing: Option<String>,
        /// Store the chart as a report in the workbook
        #[arg(long)]
        save: bool,
    },
    /// List the records of one collection
    List { workbook: PathBuf, collection: String },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> CalcResult<EstimatorConfig> {
    match path {
        Some(path) => EstimatorConfig::load_from(path),
        None => match EstimatorConfig::default_path() {
            Ok(path) => EstimatorConfig::load_from(&path),
            Err(e) => {
                log::warn!("{}; using built-in defaults", e);
                Ok(EstimatorConfig::default())
            }
        },
    }
}

fn run(cli: Cli) -> CalcResult<()> {
    let config = load_config(cli.config.as_deref())?;
    log::debug!("Using config {:?}", config);

    match cli.command {
        Commands::Convert {
            category,
            from,
            to,
            value,
            save,
        } => {
            let record = ConversionRecord::new(ConversionQuantity::new(category, from, to, value))?;
            let q = &record.quantity;
            println!(
                "{} {} = {:.*} {}",
                q.value,
                q.from_unit,
                config.display.conversion_decimals as usize,
                record.result,
                q.to_unit
            );
            print_json(cli.json, &record);
            if let Some(path) = save {
                store_item(&path, &config, CalculationItem::Conversion(record))?;
            }
        }

        Commands::Weight {
            shape,
            length,
            width,
            thickness,
            od,
            id,
            af,
            sg,
            material,
            save,
        } => {
            let mut form = WeightForm::with_defaults(config.weight);
            form.select_shape(shape.unwrap_or(config.weight.shape))?;

            if let Some(name) = material {
                let library = match &save {
                    Some(path) if path.exists() => load_workbook(path)?.material_library(),
                    _ => MaterialLibrary::standard(),
                };
                form.select_material(&library, &name)?;
            } else if let Some(sg) = sg {
                form.set_specific_gravity(sg)?;
            }

            let dimensions = [
                ("length", length),
                ("width", width),
                ("thickness", thickness),
                ("outer_diameter", od),
                ("inner_diameter", id),
                ("across_flats", af),
            ];
            for (field, value) in dimensions {
                if let Some(value) = value {
                    form.set_dimension(field, value)?;
                }
            }

            // The form shows zero while incomplete; here a missing dimension is an error
            let result = compute_weight(form.shape(), form.specific_gravity())?;
            let record = WeightRecord::new(
                WeightInput {
                    material_name: form.material_name().to_string(),
                    specific_gravity: form.specific_gravity(),
                    shape: *form.shape(),
                },
                result,
            );

            println!("Shape:            {}", record.shape_kind().label());
            for (field, value) in form.shape().dimensions() {
                println!("  {:<16}{} mm", field, value);
            }
            if !record.input.material_name.is_empty() {
                println!("Material:         {}", record.input.material_name);
            }
            println!("Specific gravity: {}", record.input.specific_gravity);
            let display = &config.display;
            println!(
                "Volume:           {:.*} mm³",
                display.volume_decimals as usize, result.volume_mm3
            );
            println!(
                "Weight:           {:.*} kg",
                display.weight_decimals as usize, result.weight_kg
            );
            print_json(cli.json, &record);

            if let Some(path) = save {
                store_item(&path, &config, CalculationItem::Weight(record))?;
            }
        }

        Commands::Estimate { input, save } => {
            let content = std::fs::read_to_string(&input).map_err(|e| {
                CalcError::file_error("read", input.display().to_string(), e.to_string())
            })?;
            let input: EstimationInput =
                serde_json::from_str(&content).map_err(CalcError::serialization)?;
            let record = EstimationRecord::from_input(input);
            print_estimation(&record, &config);
            print_json(cli.json, &record);

            if let Some(path) = save {
                store_item(&path, &config, CalculationItem::Estimation(record))?;
            }
        }

        Commands::Process {
            workbook,
            customer,
            operation,
            cycle_time,
            process_name,
            project,
            part,
            drawing,
        } => {
            if !(cycle_time.is_finite() && cycle_time >= 0.0) {
                return Err(CalcError::invalid_input(
                    "cycle_time",
                    cycle_time.to_string(),
                    "Cycle time cannot be negative",
                ));
            }
            let record = ProcessRecord {
                process_name,
                project_id: project,
                part_name: part,
                drawing_number: drawing,
                ..ProcessRecord::new(customer, operation, cycle_time)
            };
            store_item(&workbook, &config, CalculationItem::Process(record))?;
        }

        Commands::Chart {
            workbook: path,
            customer,
            operation,
            project,
            part,
            drawing,
            save,
        } => {
            let workbook = load_workbook(&path)?;
            let records = workbook.process_records();

            let Some(operation) = operation else {
                println!("Operations on record:");
                for name in unique_operations(&records) {
                    println!("  {}", name);
                }
                return Err(CalcError::missing_field("operation_name"));
            };

            let filter = ChartFilter {
                project_id: project,
                part_name: part,
                drawing_number: drawing,
                ..ChartFilter::new(customer, operation)
            };
            let chart = build_chart(&records, &filter)?;

            println!("{} / {}", chart.filter.customer_name, chart.filter.operation_name);
            for point in &chart.points {
                println!("  {:<24}{:>10.2}", point.process_name, point.cycle_time);
            }
            println!();
            println!("Processes:       {}", chart.total_processes);
            println!("Total cycle:     {:.2}", chart.total_cycle_time);
            println!("Average cycle:   {:.2}", chart.average_cycle_time);
            print_json(cli.json, &chart);

            if save {
                store_item(&path, &config, CalculationItem::ChartReport(chart))?;
            }
        }

        Commands::List { workbook, collection } => {
            if !collections::ALL.contains(&collection.as_str()) {
                return Err(CalcError::invalid_input(
                    "collection",
                    collection,
                    format!("Expected one of: {}", collections::ALL.join(", ")),
                ));
            }
            let workbook = load_workbook(&workbook)?;
            let records = workbook.get_all(&collection);
            if records.is_empty() {
                println!("No records in {}", collection);
            }
            for record in &records {
                println!(
                    "{}  {}  {:<12} {}",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.item.calc_type(),
                    record.item.label()
                );
            }
            print_json(cli.json, &records);
        }
    }

    Ok(())
}

fn print_estimation(record: &EstimationRecord, config: &EstimatorConfig) {
    let input = &record.input;
    let b = &record.breakdown;
    let money = |amount: f64| config.display.money(amount);

    println!("═══════════════════════════════════════");
    println!("  MANUAL ESTIMATION");
    println!("═══════════════════════════════════════");
    if !input.header.customer_name.is_empty() {
        println!("Customer:  {}", input.header.customer_name);
    }
    if !input.part.part_name.is_empty() {
        println!("Part:      {} ({})", input.part.part_name, input.part.material);
    }
    println!("Status:    {}", input.status.as_str());
    println!();
    println!("Material cost:            {}", money(b.material_cost));
    for line in &input.processes {
        println!("  {:<24}{}", line.process_name, money(line.line_cost()));
    }
    println!("Process cost:             {}", money(b.total_process_cost));
    println!("Part cost:                {}", money(b.part_cost));
    println!("Total part cost (x{}):    {}", input.quantity, money(b.total_part_cost));
    println!("Manufacturing cost (net): {}", money(b.manufacturing_cost_net));
    println!("Manufacturing cost:       {}", money(b.manufacturing_cost_gross));
    println!("Profit ({}%):             {}", input.profit_pct, money(b.profit_amount));
    println!("Packing ({}%):            {}", input.packing_pct, money(b.packing_amount));
    println!("Overheads ({}%):          {}", input.overheads_pct, money(b.overheads_amount));
    println!("═══════════════════════════════════════");
    println!("  PROJECT COST: {}", money(b.project_cost));
    println!("═══════════════════════════════════════");
}

fn print_json<T: Serialize>(enabled: bool, value: &T) {
    if !enabled {
        return;
    }
    println!();
    println!("JSON Output:");
    if let Ok(json) = serde_json::to_string_pretty(value) {
        println!("{}", json);
    }
}

/// Append an item to the workbook at `path` under an edit lock.
fn store_item(path: &Path, config: &EstimatorConfig, item: CalculationItem) -> CalcResult<()> {
    let _lock = FileLock::acquire(path, config.workbook.user_id.as_str())?;
    let mut workbook = load_or_create_workbook(path, &config.workbook.user_id)?;
    let id = workbook.add_item(item);
    save_workbook(&workbook, path)?;
    println!("Saved {} to {}", id, path.display());
    Ok(())
}
