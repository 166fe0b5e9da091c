//! The canonical network stack declaration.
//!
//! One VPC with a public and a private subnet in a single availability
//! zone. The public subnet routes through an internet gateway and hosts a
//! web server; the private subnet routes through a NAT gateway and hosts a
//! backend instance reachable only from inside the VPC.
//!
//! The declaration is evaluated once, synchronously, and always produces
//! the same graph for the same [`StackConfig`].

use tracing::info;

use crate::cidr::Cidr;
use crate::config::StackConfig;
use crate::error::Result;
use crate::graph::{Output, Topology};
use crate::resources::{
    AclEntry, ElasticIp, IngressRule, Instance, InternetGateway, MachineImage, NatGateway,
    NetworkAcl, Protocol, RouteTable, RouteTarget, RuleAction, SecurityGroup, Subnet, UserData,
    Vpc,
};

/// Boot script for the public web server.
const PUBLIC_BOOT_SCRIPT: &str = "#!/bin/bash
yum update -y
yum install -y httpd
systemctl start httpd
systemctl enable httpd
echo \"<h1>Hello from Public Instance</h1>\" > /var/www/html/index.html";

/// Boot script for the private backend host.
const PRIVATE_BOOT_SCRIPT: &str = "#!/bin/bash
yum update -y
echo \"Private instance setup complete\" > /home/ec2-user/setup.log";

/// Declares the canonical topology and validates it.
///
/// The returned graph is complete: every cross-reference resolves, the
/// subnet blocks nest inside the VPC block, and the deployment order is
/// well-defined.
pub fn network_stack(config: &StackConfig) -> Result<Topology> {
    let mut topology = Topology::new();
    let az = config.availability_zone.as_str();

    let vpc = topology.add("Vpc", Vpc::new(config.vpc_cidr).with_name("MyVPC"))?;

    let igw = topology.add(
        "InternetGateway",
        InternetGateway::new(vpc.clone()).with_name("MyVPC-IGW"),
    )?;

    let public_subnet = topology.add(
        "PublicSubnet",
        Subnet::new(vpc.clone(), config.public_subnet_cidr, az)
            .public()
            .with_name("Public Subnet"),
    )?;
    let private_subnet = topology.add(
        "PrivateSubnet",
        Subnet::new(vpc.clone(), config.private_subnet_cidr, az).with_name("Private Subnet"),
    )?;

    let nat_eip = topology.add("NatGatewayEip", ElasticIp::new().with_name("NAT Gateway EIP"))?;
    let nat = topology.add(
        "NatGateway",
        NatGateway::new(nat_eip, public_subnet.clone()).with_name("NAT Gateway"),
    )?;

    topology.add(
        "PublicRouteTable",
        RouteTable::new(vpc.clone())
            .with_default_route(RouteTarget::InternetGateway(igw))
            .with_subnet(public_subnet.clone())
            .with_name("Public Route Table"),
    )?;
    topology.add(
        "PrivateRouteTable",
        RouteTable::new(vpc.clone())
            .with_default_route(RouteTarget::NatGateway(nat.clone()))
            .with_subnet(private_subnet.clone())
            .with_name("Private Route Table"),
    )?;

    // Public subnet filter: everything in and out.
    topology.add(
        "PublicNetworkAcl",
        NetworkAcl::new(vpc.clone())
            .with_entry(AclEntry::ingress(
                100,
                Protocol::All,
                RuleAction::Allow,
                Cidr::ANY,
            ))
            .with_entry(AclEntry::egress(
                100,
                Protocol::All,
                RuleAction::Allow,
                Cidr::ANY,
            ))
            .with_subnet(public_subnet.clone())
            .with_name("Public Network ACL"),
    )?;

    // Private subnet filter: anything from inside the VPC, plus TCP return
    // traffic on the ephemeral range, and everything outbound.
    topology.add(
        "PrivateNetworkAcl",
        NetworkAcl::new(vpc.clone())
            .with_entry(AclEntry::ingress(
                100,
                Protocol::All,
                RuleAction::Allow,
                config.vpc_cidr,
            ))
            .with_entry(
                AclEntry::ingress(110, Protocol::Tcp, RuleAction::Allow, Cidr::ANY)
                    .with_ports(1024, 65535),
            )
            .with_entry(AclEntry::egress(
                100,
                Protocol::All,
                RuleAction::Allow,
                Cidr::ANY,
            ))
            .with_subnet(private_subnet.clone())
            .with_name("Private Network ACL"),
    )?;

    let public_group = topology.add(
        "PublicSecurityGroup",
        SecurityGroup::new(vpc.clone(), "Security group for public EC2 instance")
            .with_ingress(IngressRule::tcp(Cidr::ANY, 22).with_description("Allow SSH access"))
            .with_ingress(IngressRule::tcp(Cidr::ANY, 80).with_description("Allow HTTP access"))
            .with_ingress(IngressRule::tcp(Cidr::ANY, 443).with_description("Allow HTTPS access")),
    )?;

    let private_group = topology.add(
        "PrivateSecurityGroup",
        SecurityGroup::new(vpc.clone(), "Security group for private EC2 instance")
            .with_ingress(
                IngressRule::tcp(config.public_subnet_cidr, 22)
                    .with_description("Allow SSH from public subnet"),
            )
            .with_ingress(
                IngressRule::all_traffic(config.vpc_cidr)
                    .with_description("Allow all traffic from VPC"),
            ),
    )?;

    let public_instance = topology.add(
        "PublicInstance",
        Instance::new(
            MachineImage::AmazonLinux2,
            &config.instance_type,
            public_subnet.clone(),
            public_group,
        )
        .with_key_name(&config.key_name)
        .with_user_data(UserData::shell(PUBLIC_BOOT_SCRIPT))
        .with_name("Public Web Server"),
    )?;
    let private_instance = topology.add(
        "PrivateInstance",
        Instance::new(
            MachineImage::AmazonLinux2,
            &config.instance_type,
            private_subnet.clone(),
            private_group,
        )
        .with_key_name(&config.key_name)
        .with_user_data(UserData::shell(PRIVATE_BOOT_SCRIPT))
        .with_name("Private Server"),
    )?;

    topology.add_output("VpcId", Output::id(vpc).with_description("VPC ID"))?;
    topology.add_output(
        "PublicSubnetId",
        Output::id(public_subnet).with_description("Public Subnet ID"),
    )?;
    topology.add_output(
        "PrivateSubnetId",
        Output::id(private_subnet).with_description("Private Subnet ID"),
    )?;
    topology.add_output(
        "PublicInstanceId",
        Output::id(public_instance.clone()).with_description("Public EC2 Instance ID"),
    )?;
    topology.add_output(
        "PrivateInstanceId",
        Output::id(private_instance).with_description("Private EC2 Instance ID"),
    )?;
    topology.add_output(
        "PublicInstanceIp",
        Output::attribute(public_instance, "public_ip")
            .with_description("Public Instance Public IP"),
    )?;
    topology.add_output(
        "NatGatewayId",
        Output::id(nat).with_description("NAT Gateway ID"),
    )?;

    topology.validate()?;
    info!(
        region = %config.region,
        availability_zone = %config.availability_zone,
        resources = topology.len(),
        "declared network stack"
    );
    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_is_deterministic() {
        let config = StackConfig::default();
        let a = network_stack(&config).unwrap();
        let b = network_stack(&config).unwrap();
        let ids_a: Vec<&str> = a.iter().map(|(id, _)| id).collect();
        let ids_b: Vec<&str> = b.iter().map(|(id, _)| id).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(a.len(), 14);
    }

    #[test]
    fn test_boot_scripts_are_carried_verbatim() {
        let topology = network_stack(&StackConfig::default()).unwrap();
        let Some(crate::resources::Resource::Instance(instance)) = topology.get("PublicInstance")
        else {
            panic!("missing public instance");
        };
        let script = instance.user_data.as_ref().unwrap().as_plain();
        assert!(script.starts_with("#!/bin/bash"));
        assert!(script.contains("httpd"));
    }
}
