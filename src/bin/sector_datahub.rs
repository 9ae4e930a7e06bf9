use sector_datahub::charts::{ChartRenderer, TextChartRenderer};
use sector_datahub::config::Config;
use sector_datahub::report::Report;
use sector_datahub::report_store::ReportStore;
use sector_datahub::scrapers::google::GoogleFinanceFetcher;
use sector_datahub::storage::json_file::JsonFileStore;
use sector_datahub::util;

use anyhow::{anyhow, Context};
use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use std::sync::Arc;

fn date_arg() -> Arg<'static> {
    Arg::with_name("date")
        .short('d')
        .long("date")
        .value_name("DATE")
        .help("Report date (YYYY-MM-DD), defaults to the latest stored report")
        .takes_value(true)
}

fn sector_arg(required: bool) -> Arg<'static> {
    Arg::with_name("sector")
        .short('s')
        .long("sector")
        .value_name("SECTOR")
        .help("Sector name, e.g. Technology")
        .required(required)
        .takes_value(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    // 创建基本的命令行应用
    let app = App::new("SectorHub")
        .version("1.0.0")
        .author("DataHub Team")
        .about("Daily sector performance history")
        .arg(
            Arg::with_name("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the document store")
                .takes_value(true)
                .default_value("data"),
        )
        .arg(
            Arg::with_name("database")
                .long("database")
                .value_name("NAME")
                .takes_value(true)
                .default_value("finance"),
        )
        .arg(
            Arg::with_name("collection")
                .long("collection")
                .value_name("NAME")
                .takes_value(true)
                .default_value("sector_reports"),
        );

    // 在开发模式下添加调试参数
    #[cfg(debug_assertions)]
    let app = app
        .arg(
            Arg::with_name("debug")
                .long("debug")
                .help("Enable debug mode")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("debug-limit")
                .long("debug-limit")
                .help("Limit the number of sectors to scrape in debug mode")
                .takes_value(true)
                .default_value("2"),
        );

    // 添加子命令
    let app = app
        .subcommand(SubCommand::with_name("refresh").about("Scrape today's sector report and store it"))
        .subcommand(
            SubCommand::with_name("report")
                .about("Summarize one day's report")
                .arg(date_arg())
                .arg(sector_arg(false))
                .arg(
                    Arg::with_name("stock")
                        .long("stock")
                        .value_name("STOCK")
                        .help("Show the change of a top mover")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("relative")
                        .long("relative")
                        .value_names(&["SECTOR1", "SECTOR2"])
                        .help("Relative performance of SECTOR1 against SECTOR2")
                        .number_of_values(2)
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("series")
                .about("Show a sector's change over all stored dates")
                .arg(sector_arg(true)),
        )
        .subcommand(SubCommand::with_name("extremes").about("Show the greatest sector and stock moves ever"))
        .subcommand(
            SubCommand::with_name("plot")
                .about("Draw a text chart")
                .subcommand(SubCommand::with_name("market").about("Sector moves of one day").arg(date_arg()))
                .subcommand(
                    SubCommand::with_name("sector")
                        .about("A sector's change over time")
                        .arg(sector_arg(true)),
                )
                .subcommand(SubCommand::with_name("averages").about("Average move of every sector")),
        );

    let matches = app.get_matches();

    // 获取调试模式设置
    #[cfg(debug_assertions)]
    let debug_mode = matches.is_present("debug");
    #[cfg(not(debug_assertions))]
    let debug_mode = false;

    #[cfg(debug_assertions)]
    let debug_sector_limit = matches
        .value_of("debug-limit")
        .unwrap_or("2")
        .parse::<usize>()
        .unwrap_or(2);
    #[cfg(not(debug_assertions))]
    let debug_sector_limit = usize::MAX;

    // 创建配置
    let config = Config::new()
        .with_debug_mode(debug_mode)
        .with_debug_sector_limit(debug_sector_limit)
        .with_data_dir(matches.value_of("data-dir").unwrap_or("data"))
        .with_database(matches.value_of("database").unwrap_or("finance"))
        .with_collection(matches.value_of("collection").unwrap_or("sector_reports"));

    let document_store = JsonFileStore::open(&config).context("opening document store")?;
    let fetcher = GoogleFinanceFetcher::new(&config)?;
    let mut store = ReportStore::new(Box::new(document_store), Arc::new(fetcher))?;

    match matches.subcommand() {
        Some(("refresh", _)) => {
            store.refresh().await?;
            info!("Store now holds {} reports", store.len());
        }
        Some(("report", sub)) => {
            if let Some(report) = select_report(&store, sub)? {
                print_report(report, sub)?;
            }
        }
        Some(("series", sub)) => {
            let sector = sub.value_of("sector").unwrap_or_default();
            for (date, change) in store.sector_time_series(sector)? {
                println!("{}  {:>8.2}%", date, change);
            }
            println!("Average {} move: {:.2}%", sector, store.average_sector_move(sector)?);
        }
        Some(("extremes", _)) => {
            let sector = store.greatest_sector_move_ever()?;
            println!("Greatest sector move: {} on {} ({:+.2}%)", sector.name, sector.date, sector.change);
            let stock = store.greatest_stock_move_ever()?;
            println!("Greatest stock move: {} on {} ({:+.2}%)", stock.name, stock.date, stock.change);
        }
        Some(("plot", sub)) => {
            let renderer = TextChartRenderer::new(config.chart_width);
            let series = match sub.subcommand() {
                Some(("market", m)) => match select_report(&store, m)? {
                    Some(report) => report.market_move_chart(),
                    None => return Ok(()),
                },
                Some(("sector", m)) => store.sector_changes_chart(m.value_of("sector").unwrap_or_default())?,
                Some(("averages", _)) => store.average_sector_moves_chart()?,
                _ => return Err(anyhow!("Choose a chart: market, sector or averages")),
            };
            print!("{}", renderer.render(&series)?);
        }
        _ => info!("No command specified. Use --help for usage information."),
    }

    Ok(())
}

fn select_report<'a>(store: &'a ReportStore, matches: &ArgMatches) -> anyhow::Result<Option<&'a Report>> {
    let report = match matches.value_of("date") {
        Some(date_str) => {
            let date = util::parse_date(date_str)?;
            store.get_report(&date)
        }
        None => store.latest_report(),
    };
    if report.is_none() {
        println!("There is no report at the requested date");
    }
    Ok(report)
}

fn print_report(report: &Report, matches: &ArgMatches) -> anyhow::Result<()> {
    println!("Sector report for {}", report.date());
    println!("{:-<40}", "");
    for sector in report.sectors() {
        println!("{:<30} {:>8.2}%", sector.name, sector.change);
    }
    println!("{:-<40}", "");
    println!("Greatest sector move: {}", report.greatest_move_sector()?);
    match report.greatest_stock_move() {
        Some((stock, change)) => println!("Greatest stock move: {} ({:+.2}%)", stock, change),
        None => println!("Greatest stock move: none identified"),
    }
    println!("Average market move: {:.2}%", report.average_market_move()?);

    if let Some(sector) = matches.value_of("sector") {
        println!("{}: {:+.2}%", sector, report.change_for_sector(sector)?);
    }
    if let Some(stock) = matches.value_of("stock") {
        println!("{}: {:+.2}%", stock, report.change_for_stock(stock)?);
    }
    if let Some(values) = matches.values_of("relative") {
        let pair: Vec<&str> = values.collect();
        if let [sec1, sec2] = pair.as_slice() {
            println!(
                "{} vs {}: {:+.2} points",
                sec1,
                sec2,
                report.sector_relative_performance(sec1, sec2)?
            );
        }
    }
    Ok(())
}
