use crate::cli::QueryArgs;
use crate::error::{CliError, Result};
use crate::frontend::{FlatRequest, Reply};
use ligfilter::relay::codec::{FrameReader, FrameWriter};
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::{debug, info};

pub fn request_from_args(args: &QueryArgs) -> FlatRequest {
    let mut request = FlatRequest::new();
    for (property, spec) in args.ranges.given() {
        if let Some(lb) = spec.lb {
            request.insert(format!("{}_lb", property.key()), lb);
        }
        if let Some(ub) = spec.ub {
            request.insert(format!("{}_ub", property.key()), ub);
        }
    }
    request
}

pub async fn run(args: QueryArgs) -> Result<()> {
    let request = request_from_args(&args);
    debug!("Sending {:?} to {}", request, args.addr);

    let stream = TcpStream::connect(args.addr).await?;
    let (reader, writer) = stream.into_split();
    FrameWriter::new(writer).send(&request).await?;

    let reply = FrameReader::new(BufReader::new(reader))
        .next::<Reply>()
        .await?
        .ok_or_else(|| CliError::Argument(format!("{} closed without replying", args.addr)))?;

    match reply {
        Reply::Ligands { ligands } => {
            info!("{} ligands match", ligands);
            println!("{}", ligands);
            Ok(())
        }
        Reply::Error { error } => Err(CliError::Argument(match error.field {
            Some(field) => format!("{}: {}", field, error.message),
            None => error.message,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::RangeArgs;
    use crate::utils::parser::RangeSpec;

    #[test]
    fn only_given_sides_are_sent() {
        let args = QueryArgs {
            addr: "127.0.0.1:3000".parse().unwrap(),
            ranges: RangeArgs {
                mwt: Some(RangeSpec {
                    lb: Some(200.0),
                    ub: Some(400.0),
                }),
                chg: Some(RangeSpec {
                    lb: None,
                    ub: Some(1.0),
                }),
                ..RangeArgs::default()
            },
        };
        let request = request_from_args(&args);
        assert_eq!(request.len(), 3);
        assert_eq!(request["mwt_lb"], 200.0);
        assert_eq!(request["mwt_ub"], 400.0);
        assert_eq!(request["chg_ub"], 1.0);
    }
}
