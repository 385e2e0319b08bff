use std::net::IpAddr;

use poem::Request;
use uuid::Uuid;

/// Client-facing request metadata that flows into activity log records.
///
/// Built once at the top of every endpoint and passed down through the
/// service layer; stores never look at the HTTP request themselves.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// User-Agent header as presented by the client
    pub user_agent: Option<String>,

    /// Correlation id for tracing a request across layers and log entries
    pub correlation_id: String,
}

impl RequestMeta {
    /// Extract metadata from an inbound HTTP request.
    ///
    /// IP resolution checks X-Forwarded-For, then X-Real-IP, then the remote
    /// address. A client-supplied X-Correlation-Id is honored when present.
    pub fn from_request(req: &Request) -> Self {
        let correlation_id = req
            .header("X-Correlation-Id")
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            ip_address: Self::extract_ip_address(req),
            user_agent: req.header("User-Agent").map(str::to_string),
            correlation_id,
        }
    }

    /// Metadata for operations not driven by an HTTP request (CLI, seeding)
    pub fn for_system(operation_name: &str) -> Self {
        Self {
            ip_address: None,
            user_agent: Some(format!("system:{}", operation_name)),
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    fn extract_ip_address(req: &Request) -> Option<IpAddr> {
        // X-Forwarded-For (proxy/load balancer)
        if let Some(forwarded) = req.header("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                if let Ok(parsed) = ip.trim().parse() {
                    return Some(parsed);
                }
            }
        }

        // X-Real-IP (nginx)
        if let Some(real_ip) = req.header("X-Real-IP") {
            if let Ok(parsed) = real_ip.parse() {
                return Some(parsed);
            }
        }

        req.remote_addr().as_socket_addr().map(|addr| addr.ip())
    }

    /// Masked rendition of the client IP for records that must not assert a
    /// specific identity. IPv4 keeps the first two octets; IPv6 keeps the
    /// first segment.
    pub fn masked_ip(&self) -> String {
        match self.ip_address {
            Some(IpAddr::V4(v4)) => {
                let octets = v4.octets();
                format!("{}.{}.x.x", octets[0], octets[1])
            }
            Some(IpAddr::V6(v6)) => {
                let segments = v6.segments();
                format!("{:x}:x:x:x:x:x:x:x", segments[0])
            }
            None => "unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masked_ip_hides_host_octets() {
        let meta = RequestMeta {
            ip_address: Some("192.168.14.7".parse().unwrap()),
            user_agent: None,
            correlation_id: "test".to_string(),
        };
        assert_eq!(meta.masked_ip(), "192.168.x.x");
    }

    #[test]
    fn masked_ip_without_address_is_unknown() {
        let meta = RequestMeta {
            ip_address: None,
            user_agent: None,
            correlation_id: "test".to_string(),
        };
        assert_eq!(meta.masked_ip(), "unknown");
    }
}
