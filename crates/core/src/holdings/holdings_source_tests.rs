use std::io::Write;

use rust_decimal_macros::dec;
use tempfile::NamedTempFile;

use pulsefolio_market_data::ExchangeCode;

use super::*;

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_static_source_returns_default_list() {
    let holdings = StaticHoldingsSource::default().load_holdings().await.unwrap();

    let symbols: Vec<&str> = holdings.iter().map(|h| h.particulars.as_str()).collect();
    assert_eq!(symbols, vec!["TCS", "RELIANCE", "HDFCBANK", "LT"]);
    assert_eq!(holdings[0].purchase_price, dec!(3600));
    assert_eq!(holdings[0].quantity, 12);
    assert_eq!(holdings[3].sector.as_deref(), Some("Infrastructure"));
}

#[tokio::test]
async fn test_csv_source_reads_rows() {
    let file = csv_file(
        "particulars,purchasePrice,quantity,exchangeCode,sector\n\
         tcs,3600,12,NSE,IT Services\n\
         RELIANCE,2450.50,20,BSE,Energy\n",
    );

    let holdings = CsvHoldingsSource::new(file.path())
        .load_holdings()
        .await
        .unwrap();

    assert_eq!(holdings.len(), 2);
    assert_eq!(holdings[0].particulars, "TCS");
    assert_eq!(holdings[0].exchange_code, ExchangeCode::Nse);
    assert_eq!(holdings[1].purchase_price, dec!(2450.50));
    assert_eq!(holdings[1].exchange_code, ExchangeCode::Bse);
    assert_eq!(holdings[1].sector.as_deref(), Some("Energy"));
}

#[tokio::test]
async fn test_csv_source_column_aliases_and_inferred_sector() {
    let file = csv_file(
        "Stock,buy_price,qty,Exchange\n\
         icicibank,950,10,bse\n\
         sunpharma,1200,5,\n\
         tatasteel,140,100,NSE\n\
         infy,1500,4,NSE\n\
         itc,400,50,NSE\n",
    );

    let holdings = CsvHoldingsSource::new(file.path())
        .load_holdings()
        .await
        .unwrap();

    let sectors: Vec<&str> = holdings.iter().map(|h| h.sector_label()).collect();
    assert_eq!(
        sectors,
        vec!["Banking", "Pharma", "Manufacturing", "IT Services", "Unspecified"]
    );
    assert_eq!(holdings[0].exchange_code, ExchangeCode::Bse);
    assert_eq!(holdings[1].exchange_code, ExchangeCode::Nse);
}

#[tokio::test]
async fn test_csv_source_skips_invalid_rows() {
    let file = csv_file(
        "particulars,purchasePrice,quantity,exchangeCode\n\
         TCS,3600,12,NSE\n\
         ,100,1,NSE\n\
         WIPRO,abc,10,NSE\n\
         HCLTECH,1200,0,NSE\n\
         LT,-5,3,NSE\n\
         ONGC,250,2.5,NSE\n\
         MARUTI,,3,NSE\n",
    );

    let holdings = CsvHoldingsSource::new(file.path())
        .load_holdings()
        .await
        .unwrap();

    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].particulars, "TCS");
}

#[test]
fn test_read_csv_skips_rows_whose_value_overflows() {
    let file = csv_file(
        "particulars,purchasePrice,quantity,exchangeCode\n\
         TCS,79228162514264337593543950335,2,NSE\n\
         INFY,1500,4,NSE\n",
    );

    let holdings = read_holdings_csv(file.path()).unwrap();

    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].particulars, "INFY");
    assert_eq!(holdings[0].investment(), Some(dec!(6000)));
}

#[tokio::test]
async fn test_csv_source_falls_back_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let source = CsvHoldingsSource::new(dir.path().join("does-not-exist.csv"));

    let holdings = source.load_holdings().await.unwrap();
    assert_eq!(holdings, default_holdings());
}

#[tokio::test]
async fn test_csv_source_falls_back_when_no_usable_rows() {
    let file = csv_file("Name,Price\nfoo,bar\n");

    let holdings = CsvHoldingsSource::new(file.path())
        .load_holdings()
        .await
        .unwrap();
    assert_eq!(holdings, default_holdings());
}

#[tokio::test]
async fn test_csv_source_is_memoized() {
    let mut file = csv_file("particulars,purchasePrice,quantity\nTCS,3600,12\n");
    let source = CsvHoldingsSource::new(file.path());

    let first = source.load_holdings().await.unwrap();

    file.write_all(b"INFY,1500,4\n").unwrap();
    file.flush().unwrap();

    let second = source.load_holdings().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second.len(), 1);
}

#[test]
fn test_infer_sector() {
    assert_eq!(infer_sector("HDFCBANK"), "Banking");
    assert_eq!(infer_sector("JSWSTEEL"), "Manufacturing");
    assert_eq!(infer_sector("INDIGO"), "Manufacturing");
    assert_eq!(infer_sector("CIPLAPHARMA"), "Pharma");
    assert_eq!(infer_sector("TECHM"), "IT Services");
    assert_eq!(infer_sector("RELIANCE"), "Unspecified");
}
